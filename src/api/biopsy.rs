use crate::api::{authenticate, BearerAuth};
use crate::app_data::AppData;
use crate::errors::clinical::ClinicalError;
use crate::types::dto::patient::{UploadBiopsyPayload, UploadBiopsyResponse};
use crate::types::internal::auth::{AuthenticatedUser, Operation};
use poem_openapi::param::Path;
use poem_openapi::payload::{Binary, Json};
use poem_openapi::{OpenApi, Tags};
use std::sync::Arc;

/// Biopsy upload and retrieval API endpoints
pub struct BiopsyApi {
    app_data: Arc<AppData>,
}

impl BiopsyApi {
    /// Create a new BiopsyApi backed by the shared application data
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    /// Store uploaded bytes and append the reference to the patient's log
    ///
    /// The file is written before the reference row; if that insert fails the
    /// file is removed again so storage and database stay consistent.
    async fn store_upload(
        &self,
        user: &AuthenticatedUser,
        patient_id: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, ClinicalError> {
        if !user.role.permits(Operation::UploadBiopsy) {
            return Err(ClinicalError::forbidden());
        }

        // Reject bad extensions and unknown patients before any bytes land
        if !crate::stores::ImageStore::allowed_file(original_filename) {
            return Err(ClinicalError::unsupported_file_type(original_filename));
        }
        if self.app_data.patient_store.get(patient_id).await?.is_none() {
            return Err(ClinicalError::not_found(patient_id));
        }

        let stored_filename = self
            .app_data
            .image_store
            .store(patient_id, original_filename, bytes)
            .await?;

        if let Err(e) = self
            .app_data
            .patient_store
            .append_image_ref(patient_id, &stored_filename, original_filename)
            .await
        {
            // Compensating cleanup: do not leave unreferenced bytes behind
            self.app_data.image_store.remove(&stored_filename).await;
            return Err(e.into());
        }

        tracing::info!(patient = %patient_id, file = %stored_filename, by = %user.id, "biopsy stored");

        Ok(stored_filename)
    }
}

/// API tags for biopsy endpoints
#[derive(Tags)]
enum BiopsyTags {
    /// Biopsy upload endpoints
    Biopsy,
}

#[OpenApi]
impl BiopsyApi {
    /// Upload a biopsy file for a patient
    ///
    /// Accepts png, jpg, jpeg, and pdf, matched case-insensitively.
    #[oai(path = "/patients/biopsy", method = "post", tag = "BiopsyTags::Biopsy")]
    async fn upload_biopsy(
        &self,
        auth: BearerAuth,
        payload: UploadBiopsyPayload,
    ) -> Result<Json<UploadBiopsyResponse>, ClinicalError> {
        let user = authenticate(&self.app_data.token_service, &auth)?;

        let original_filename = payload
            .file
            .file_name()
            .map(|name| name.to_string())
            .unwrap_or_default();

        let bytes = payload
            .file
            .into_vec()
            .await
            .map_err(ClinicalError::internal_error)?;

        let stored_filename = self
            .store_upload(&user, &payload.patient_id, &original_filename, &bytes)
            .await?;

        Ok(Json(UploadBiopsyResponse {
            stored_filename,
            message: "Upload stored".to_string(),
        }))
    }

    /// Serve a previously stored upload
    #[oai(path = "/uploads/:filename", method = "get", tag = "BiopsyTags::Biopsy")]
    async fn get_upload(
        &self,
        auth: BearerAuth,
        filename: Path<String>,
    ) -> Result<Binary<Vec<u8>>, ClinicalError> {
        let _user = authenticate(&self.app_data.token_service, &auth)?;

        let bytes = self
            .app_data
            .image_store
            .load(&filename.0)
            .await?
            .ok_or_else(|| ClinicalError::not_found(&filename.0))?;

        Ok(Binary(bytes))
    }
}
