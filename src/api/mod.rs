// API layer - HTTP endpoints
pub mod auth;
pub mod biopsy;
pub mod health;
pub mod patients;
pub mod predict;

pub use auth::AuthApi;
pub use biopsy::BiopsyApi;
pub use health::HealthApi;
pub use patients::PatientsApi;
pub use predict::PredictApi;

use crate::errors::auth::AuthError;
use crate::services::TokenService;
use crate::types::internal::auth::AuthenticatedUser;
use poem_openapi::{auth::Bearer, SecurityScheme};

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// Decode the bearer token into the explicit identity every handler passes on
///
/// This is the single place the session is turned into a value; no layer
/// below the API reads ambient authentication state.
pub fn authenticate(
    token_service: &TokenService,
    auth: &BearerAuth,
) -> Result<AuthenticatedUser, AuthError> {
    let claims = token_service.validate_jwt(&auth.0.token)?;
    AuthenticatedUser::try_from(claims).map_err(AuthError::internal_error)
}
