use poem_openapi::types::multipart::Upload;
use poem_openapi::{Multipart, Object};
use serde::{Deserialize, Serialize};

/// Request model for patient registration
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    /// New patient identifier (alphanumeric, doubles as the login username)
    pub patient_id: String,

    /// Initial login password for the patient account
    pub password: String,

    /// Patient display name (letters and whitespace only)
    pub name: String,

    /// Patient age in years
    pub age: i32,
}

/// Response model for patient registration
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreatePatientResponse {
    /// Identifier of the created patient
    pub patient_id: String,

    /// Success message
    pub message: String,
}

/// Request model for appending a clinical note
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AddNoteRequest {
    /// Patient the note belongs to
    pub patient_id: String,

    /// Free-text note body
    pub note: String,
}

/// Response model for note append
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AddNoteResponse {
    /// Success message
    pub message: String,
}

/// A single clinical note as shown on the dashboard
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct NoteView {
    /// Attributed author display name
    pub author: String,

    /// Note text
    pub body: String,

    /// Creation time (ISO 8601 format)
    pub created_at: String,
}

/// One patient record with its note and image logs
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PatientView {
    /// Patient identifier
    pub id: String,

    /// Patient display name
    pub name: String,

    /// Patient age in years
    pub age: i32,

    /// "Pending" until the first prediction, then "High Risk" / "Low Risk"
    pub risk_status: String,

    /// Probability from the last prediction ("NN.N%"), "N/A" before that
    pub last_probability: String,

    /// Ordered, append-only note log
    pub notes: Vec<NoteView>,

    /// Ordered, append-only stored image filenames
    pub images: Vec<String>,
}

/// Response model for the dashboard listing
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Records visible to the caller (all, or own record for patients)
    pub patients: Vec<PatientView>,
}

/// Multipart payload for biopsy upload
#[derive(Multipart, Debug)]
pub struct UploadBiopsyPayload {
    /// Patient the file belongs to
    pub patient_id: String,

    /// The uploaded file (png, jpg, jpeg, or pdf)
    pub file: Upload,
}

/// Response model for biopsy upload
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UploadBiopsyResponse {
    /// Name the file was stored under
    pub stored_filename: String,

    /// Success message
    pub message: String,
}
