use crate::errors::internal::{InternalError, PatientError};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{payload::Json, ApiResponse};
use std::fmt;

/// Error types for the patient record and prediction endpoints
///
/// Every failure on these paths is recovered into one of these structured
/// responses; nothing propagates as an unhandled panic.
#[derive(ApiResponse, Debug)]
pub enum ClinicalError {
    /// Registration field failed validation
    #[oai(status = 400)]
    Validation(Json<ErrorResponse>),

    /// Caller is not authenticated
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Uploaded file extension outside the accepted set
    #[oai(status = 400)]
    UnsupportedFileType(Json<ErrorResponse>),

    /// Caller's role does not permit the operation
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Operation targeted an unknown patient id
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Patient identifier already taken
    #[oai(status = 409)]
    Duplicate(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl ClinicalError {
    /// Create a Validation error with the specific rule violation
    pub fn validation(message: impl Into<String>) -> Self {
        ClinicalError::Validation(Json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: message.into(),
            status_code: 400,
        }))
    }

    /// Create an UnsupportedFileType error
    pub fn unsupported_file_type(filename: &str) -> Self {
        ClinicalError::UnsupportedFileType(Json(ErrorResponse {
            error: "unsupported_file_type".to_string(),
            message: format!(
                "File type not accepted for '{}'; allowed extensions: png, jpg, jpeg, pdf",
                filename
            ),
            status_code: 400,
        }))
    }

    /// Create an Unauthorized error
    pub fn unauthorized() -> Self {
        ClinicalError::Unauthorized(Json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: "Authentication required".to_string(),
            status_code: 401,
        }))
    }

    /// Create a Forbidden error
    pub fn forbidden() -> Self {
        ClinicalError::Forbidden(Json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "Role not permitted for this operation".to_string(),
            status_code: 403,
        }))
    }

    /// Create a NotFound error
    pub fn not_found(patient_id: &str) -> Self {
        ClinicalError::NotFound(Json(ErrorResponse {
            error: "patient_not_found".to_string(),
            message: format!("No patient record for id '{}'", patient_id),
            status_code: 404,
        }))
    }

    /// Create a Duplicate error
    pub fn duplicate() -> Self {
        ClinicalError::Duplicate(Json(ErrorResponse {
            error: "duplicate_patient_id".to_string(),
            message: "Patient ID already exists".to_string(),
            status_code: 409,
        }))
    }

    /// Create an InternalError
    ///
    /// The detail is logged server-side; callers receive an opaque body.
    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        tracing::error!("internal error on clinical path: {}", detail);
        ClinicalError::InternalError(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message: "Internal server error".to_string(),
            status_code: 500,
        }))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            ClinicalError::Validation(json) => json.0.message.clone(),
            ClinicalError::Unauthorized(json) => json.0.message.clone(),
            ClinicalError::UnsupportedFileType(json) => json.0.message.clone(),
            ClinicalError::Forbidden(json) => json.0.message.clone(),
            ClinicalError::NotFound(json) => json.0.message.clone(),
            ClinicalError::Duplicate(json) => json.0.message.clone(),
            ClinicalError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl From<crate::errors::auth::AuthError> for ClinicalError {
    fn from(err: crate::errors::auth::AuthError) -> Self {
        use crate::errors::auth::AuthError;
        match err {
            AuthError::Forbidden(json) => ClinicalError::Forbidden(json),
            AuthError::InternalError(json) => ClinicalError::InternalError(json),
            // Every other auth failure is a missing or unusable token
            AuthError::InvalidCredentials(json)
            | AuthError::InvalidToken(json)
            | AuthError::ExpiredToken(json)
            | AuthError::MissingAuthHeader(json)
            | AuthError::InvalidRefreshToken(json)
            | AuthError::ExpiredRefreshToken(json) => ClinicalError::Unauthorized(json),
        }
    }
}

impl From<InternalError> for ClinicalError {
    fn from(err: InternalError) -> Self {
        match err {
            InternalError::Patient(PatientError::DuplicateId(_)) => ClinicalError::duplicate(),
            InternalError::Patient(PatientError::NotFound(id)) => ClinicalError::not_found(&id),
            InternalError::Patient(PatientError::UnsupportedFileType(name)) => {
                ClinicalError::unsupported_file_type(&name)
            }
            other => ClinicalError::internal_error(other),
        }
    }
}

impl fmt::Display for ClinicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
