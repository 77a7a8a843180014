// Services layer - Business logic and orchestration
pub mod crypto;
pub mod password_validator;
pub mod registration_validator;
pub mod risk_model;
pub mod token_service;

pub use password_validator::{PasswordValidationError, PasswordValidator};
pub use registration_validator::{RegistrationError, RegistrationValidator};
pub use risk_model::{RiskAssessment, RiskModel};
pub use token_service::TokenService;
