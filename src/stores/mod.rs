// Stores layer - Data access and repository pattern
pub mod credential_store;
pub mod image_store;
pub mod patient_store;

pub use credential_store::CredentialStore;
pub use image_store::ImageStore;
pub use patient_store::{PatientBundle, PatientStore};
