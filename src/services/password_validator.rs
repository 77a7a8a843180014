/// Fixed set of accepted special characters for password complexity
const SPECIAL_CHARACTERS: &str = "!@#$%^&*()-_+=";

/// Password validator service that enforces the registration password policy
///
/// Implements multiple validation layers:
/// - Length validation (8-16 characters)
/// - At least one uppercase letter
/// - At least one digit
/// - At least one special character from the fixed set
pub struct PasswordValidator {
    min_length: usize,
    max_length: usize,
}

impl PasswordValidator {
    /// Create a new password validator with the 8-16 character policy
    pub fn new() -> Self {
        Self {
            min_length: 8,
            max_length: 16,
        }
    }

    /// Validate a password against all configured rules
    ///
    /// Validates in order (fail fast):
    /// 1. Length (8-16 characters)
    /// 2. Uppercase letter present
    /// 3. Digit present
    /// 4. Special character present
    ///
    /// # Arguments
    /// * `password` - The password to validate
    ///
    /// # Returns
    /// * `Ok(())` - Password passes all validation rules
    /// * `Err(PasswordValidationError)` - Password fails validation with specific reason
    pub fn validate(&self, password: &str) -> Result<(), PasswordValidationError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordValidationError::TooShort(self.min_length));
        }
        if length > self.max_length {
            return Err(PasswordValidationError::TooLong(self.max_length));
        }

        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordValidationError::MissingUppercase);
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordValidationError::MissingDigit);
        }

        if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            return Err(PasswordValidationError::MissingSpecialCharacter);
        }

        Ok(())
    }
}

impl Default for PasswordValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during password validation
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordValidationError {
    /// Password is shorter than the minimum required length
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    /// Password exceeds the maximum allowed length
    #[error("Password must not exceed {0} characters")]
    TooLong(usize),

    /// Password lacks an uppercase letter
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    /// Password lacks a digit
    #[error("Password must contain at least one digit")]
    MissingDigit,

    /// Password lacks a special character from the accepted set
    #[error("Password must contain at least one special character (!@#$%^&*()-_+=)")]
    MissingSpecialCharacter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password_passes() {
        let validator = PasswordValidator::new();
        assert!(validator.validate("Abcdef1!").is_ok());
        assert!(validator.validate("Zz9=Zz9=Zz9=Zz9=").is_ok());
    }

    #[test]
    fn test_too_short_password_rejected() {
        let validator = PasswordValidator::new();
        assert_eq!(
            validator.validate("Ab1!x"),
            Err(PasswordValidationError::TooShort(8))
        );
    }

    #[test]
    fn test_too_long_password_rejected() {
        let validator = PasswordValidator::new();
        assert_eq!(
            validator.validate("Abcdefgh1!Abcdefgh"),
            Err(PasswordValidationError::TooLong(16))
        );
    }

    #[test]
    fn test_boundary_lengths_accepted() {
        let validator = PasswordValidator::new();
        // Exactly 8 and exactly 16 characters
        assert!(validator.validate("Abcde1!x").is_ok());
        assert!(validator.validate("Abcdefghijkl1!xy").is_ok());
    }

    #[test]
    fn test_missing_uppercase_rejected() {
        let validator = PasswordValidator::new();
        assert_eq!(
            validator.validate("abcdef1!"),
            Err(PasswordValidationError::MissingUppercase)
        );
    }

    #[test]
    fn test_missing_digit_rejected() {
        let validator = PasswordValidator::new();
        assert_eq!(
            validator.validate("Abcdefg!"),
            Err(PasswordValidationError::MissingDigit)
        );
    }

    #[test]
    fn test_missing_special_character_rejected() {
        let validator = PasswordValidator::new();
        assert_eq!(
            validator.validate("Abcdefg1"),
            Err(PasswordValidationError::MissingSpecialCharacter)
        );
    }

    #[test]
    fn test_special_character_outside_fixed_set_does_not_count() {
        let validator = PasswordValidator::new();
        // '?' is not in the accepted set
        assert_eq!(
            validator.validate("Abcdefg1?"),
            Err(PasswordValidationError::MissingSpecialCharacter)
        );
    }
}
