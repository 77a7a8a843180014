// Database entities - SeaORM models
pub mod biopsy_image;
pub mod clinical_note;
pub mod patient_record;
pub mod refresh_token;
pub mod user;
