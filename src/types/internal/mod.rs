// In-process types shared between layers
pub mod auth;

pub use auth::{AuthenticatedUser, Claims, Operation, Role};
