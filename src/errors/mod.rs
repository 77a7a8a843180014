// Errors layer - Error type definitions
pub mod auth;
pub mod clinical;
pub mod internal;

// Re-exports for convenience
pub use auth::AuthError;
pub use clinical::ClinicalError;
pub use internal::{CredentialError, InternalError, PatientError};
