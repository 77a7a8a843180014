use crate::api::{authenticate, BearerAuth};
use crate::app_data::AppData;
use crate::errors::clinical::ClinicalError;
use crate::stores::PatientBundle;
use crate::types::dto::patient::{
    AddNoteRequest, AddNoteResponse, CreatePatientRequest, CreatePatientResponse,
    DashboardResponse, NoteView, PatientView,
};
use crate::types::internal::auth::Operation;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Patient record API endpoints
pub struct PatientsApi {
    app_data: Arc<AppData>,
}

impl PatientsApi {
    /// Create a new PatientsApi backed by the shared application data
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

/// API tags for patient record endpoints
#[derive(Tags)]
enum PatientTags {
    /// Patient record endpoints
    Patients,
}

#[OpenApi(prefix_path = "/patients")]
impl PatientsApi {
    /// Dashboard listing of patient records
    ///
    /// Staff roles see every record; a patient only ever sees their own.
    #[oai(path = "/", method = "get", tag = "PatientTags::Patients")]
    pub async fn dashboard(&self, auth: BearerAuth) -> Result<Json<DashboardResponse>, ClinicalError> {
        let user = authenticate(&self.app_data.token_service, &auth)?;
        if !user.role.permits(Operation::ViewDashboard) {
            return Err(ClinicalError::forbidden());
        }

        let bundles = self.app_data.patient_store.get_all_for(&user).await?;
        let patients = bundles.into_iter().map(to_view).collect();

        Ok(Json(DashboardResponse { patients }))
    }

    /// Register a new patient, creating the login and the record together
    #[oai(path = "/", method = "post", tag = "PatientTags::Patients")]
    pub async fn create_patient(
        &self,
        auth: BearerAuth,
        body: Json<CreatePatientRequest>,
    ) -> Result<Json<CreatePatientResponse>, ClinicalError> {
        let user = authenticate(&self.app_data.token_service, &auth)?;
        if !user.role.permits(Operation::CreatePatient) {
            return Err(ClinicalError::forbidden());
        }

        self.app_data
            .registration_validator
            .validate(&body)
            .map_err(|e| ClinicalError::validation(e.to_string()))?;

        let password_hash = self.app_data.credential_store.hash_password(&body.password)?;
        self.app_data
            .patient_store
            .create(&body.patient_id, &body.name, body.age, password_hash)
            .await?;

        tracing::info!(patient = %body.patient_id, by = %user.id, "patient created");

        Ok(Json(CreatePatientResponse {
            patient_id: body.patient_id.clone(),
            message: "Patient Created".to_string(),
        }))
    }

    /// Append a timestamped, author-attributed note to a patient's log
    #[oai(path = "/notes", method = "post", tag = "PatientTags::Patients")]
    pub async fn add_note(
        &self,
        auth: BearerAuth,
        body: Json<AddNoteRequest>,
    ) -> Result<Json<AddNoteResponse>, ClinicalError> {
        let user = authenticate(&self.app_data.token_service, &auth)?;
        if !user.role.permits(Operation::AddNote) {
            return Err(ClinicalError::forbidden());
        }

        self.app_data
            .patient_store
            .append_note(&body.patient_id, &user.name, &body.note)
            .await?;

        Ok(Json(AddNoteResponse {
            message: "Note added".to_string(),
        }))
    }
}

/// Flatten a stored bundle into the dashboard wire shape
fn to_view(bundle: PatientBundle) -> PatientView {
    PatientView {
        id: bundle.record.id,
        name: bundle.record.name,
        age: bundle.record.age,
        risk_status: bundle.record.risk_status,
        last_probability: bundle.record.last_probability,
        notes: bundle
            .notes
            .into_iter()
            .map(|note| NoteView {
                author: note.author_name,
                body: note.body,
                created_at: format_timestamp(note.created_at),
            })
            .collect(),
        images: bundle
            .images
            .into_iter()
            .map(|image| image.stored_filename)
            .collect(),
    }
}

fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "invalid".to_string())
}
