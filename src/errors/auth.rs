use crate::errors::internal::{CredentialError, InternalError};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{payload::Json, ApiResponse};
use std::fmt;

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Invalid username or password
    #[oai(status = 401)]
    InvalidCredentials(Json<ErrorResponse>),

    /// Invalid or malformed JWT
    #[oai(status = 401)]
    InvalidToken(Json<ErrorResponse>),

    /// JWT has expired
    #[oai(status = 401)]
    ExpiredToken(Json<ErrorResponse>),

    /// Authorization header is missing
    #[oai(status = 401)]
    MissingAuthHeader(Json<ErrorResponse>),

    /// Invalid refresh token
    #[oai(status = 401)]
    InvalidRefreshToken(Json<ErrorResponse>),

    /// Refresh token has expired
    #[oai(status = 401)]
    ExpiredRefreshToken(Json<ErrorResponse>),

    /// Caller's role does not permit the operation
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AuthError {
    /// Create an InvalidCredentials error
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(ErrorResponse {
            error: "invalid_credentials".to_string(),
            message: "Invalid username or password".to_string(),
            status_code: 401,
        }))
    }

    /// Create an InvalidToken error
    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(Json(ErrorResponse {
            error: "invalid_token".to_string(),
            message: "Invalid or malformed JWT".to_string(),
            status_code: 401,
        }))
    }

    /// Create an ExpiredToken error
    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(Json(ErrorResponse {
            error: "expired_token".to_string(),
            message: "JWT has expired".to_string(),
            status_code: 401,
        }))
    }

    /// Create a MissingAuthHeader error
    pub fn missing_auth_header() -> Self {
        AuthError::MissingAuthHeader(Json(ErrorResponse {
            error: "missing_auth_header".to_string(),
            message: "Authorization header is required".to_string(),
            status_code: 401,
        }))
    }

    /// Create an InvalidRefreshToken error
    pub fn invalid_refresh_token() -> Self {
        AuthError::InvalidRefreshToken(Json(ErrorResponse {
            error: "invalid_refresh_token".to_string(),
            message: "Invalid refresh token".to_string(),
            status_code: 401,
        }))
    }

    /// Create an ExpiredRefreshToken error
    pub fn expired_refresh_token() -> Self {
        AuthError::ExpiredRefreshToken(Json(ErrorResponse {
            error: "expired_refresh_token".to_string(),
            message: "Refresh token has expired".to_string(),
            status_code: 401,
        }))
    }

    /// Create a Forbidden error
    pub fn forbidden() -> Self {
        AuthError::Forbidden(Json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "Role not permitted for this operation".to_string(),
            status_code: 403,
        }))
    }

    /// Create an InternalError
    ///
    /// The detail is logged server-side; callers receive an opaque body.
    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        tracing::error!("internal error on auth path: {}", detail);
        AuthError::InternalError(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message: "Internal server error".to_string(),
            status_code: 500,
        }))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(json) => json.0.message.clone(),
            AuthError::InvalidToken(json) => json.0.message.clone(),
            AuthError::ExpiredToken(json) => json.0.message.clone(),
            AuthError::MissingAuthHeader(json) => json.0.message.clone(),
            AuthError::InvalidRefreshToken(json) => json.0.message.clone(),
            AuthError::ExpiredRefreshToken(json) => json.0.message.clone(),
            AuthError::Forbidden(json) => json.0.message.clone(),
            AuthError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl From<InternalError> for AuthError {
    fn from(err: InternalError) -> Self {
        match err {
            InternalError::Credential(CredentialError::InvalidCredentials) => {
                AuthError::invalid_credentials()
            }
            InternalError::Credential(CredentialError::UserNotFound(_)) => {
                // Indistinguishable from a bad password on purpose
                AuthError::invalid_credentials()
            }
            InternalError::Credential(CredentialError::InvalidToken { token_type, .. })
                if token_type == "refresh" =>
            {
                AuthError::invalid_refresh_token()
            }
            InternalError::Credential(CredentialError::InvalidToken { .. }) => {
                AuthError::invalid_token()
            }
            InternalError::Credential(CredentialError::ExpiredToken(token_type))
                if token_type == "refresh" =>
            {
                AuthError::expired_refresh_token()
            }
            InternalError::Credential(CredentialError::ExpiredToken(_)) => {
                AuthError::expired_token()
            }
            other => AuthError::internal_error(other),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
