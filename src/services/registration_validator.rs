use crate::services::password_validator::{PasswordValidationError, PasswordValidator};
use crate::types::dto::patient::CreatePatientRequest;

/// Validates all patient registration fields before any row is written
///
/// Field rules:
/// - patient_id: non-empty, ASCII alphanumeric only
/// - name: non-empty, ASCII letters and whitespace only
/// - age: 0..=130
/// - password: delegated to PasswordValidator
pub struct RegistrationValidator {
    password_validator: PasswordValidator,
}

impl RegistrationValidator {
    /// Create a registration validator with the default password policy
    pub fn new() -> Self {
        Self {
            password_validator: PasswordValidator::new(),
        }
    }

    /// Validate a full registration request, failing on the first violation
    pub fn validate(&self, request: &CreatePatientRequest) -> Result<(), RegistrationError> {
        Self::validate_patient_id(&request.patient_id)?;
        Self::validate_name(&request.name)?;
        Self::validate_age(request.age)?;
        self.password_validator.validate(&request.password)?;
        Ok(())
    }

    fn validate_patient_id(patient_id: &str) -> Result<(), RegistrationError> {
        if patient_id.is_empty() || !patient_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RegistrationError::InvalidPatientId);
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), RegistrationError> {
        let well_formed = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            && name.chars().any(|c| c.is_ascii_alphabetic());
        if !well_formed {
            return Err(RegistrationError::InvalidName);
        }
        Ok(())
    }

    fn validate_age(age: i32) -> Result<(), RegistrationError> {
        if !(0..=130).contains(&age) {
            return Err(RegistrationError::InvalidAge(age));
        }
        Ok(())
    }
}

impl Default for RegistrationValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during registration field validation
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// Patient id contains characters outside [A-Za-z0-9] or is empty
    #[error("Patient ID must contain only letters and digits")]
    InvalidPatientId,

    /// Name contains characters outside letters/whitespace or is empty
    #[error("Name must contain only letters and spaces")]
    InvalidName,

    /// Age outside the accepted range
    #[error("Age {0} is out of range")]
    InvalidAge(i32),

    /// Password failed the complexity policy
    #[error(transparent)]
    Password(#[from] PasswordValidationError),
}
