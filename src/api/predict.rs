use crate::api::{authenticate, BearerAuth};
use crate::app_data::AppData;
use crate::errors::clinical::ClinicalError;
use crate::types::dto::predict::{PredictRequest, PredictResponse};
use crate::types::internal::auth::Operation;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Risk prediction API endpoint
pub struct PredictApi {
    app_data: Arc<AppData>,
}

impl PredictApi {
    /// Create a new PredictApi backed by the shared application data
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

/// API tags for prediction endpoints
#[derive(Tags)]
enum PredictTags {
    /// Risk prediction endpoints
    Prediction,
}

#[OpenApi]
impl PredictApi {
    /// Run the risk classifier and persist the result on the patient record
    ///
    /// Every failure on this path comes back as a structured error response;
    /// a missing classifier is not a failure but a flagged fallback result.
    #[oai(path = "/predict", method = "post", tag = "PredictTags::Prediction")]
    pub async fn predict(
        &self,
        auth: BearerAuth,
        body: Json<PredictRequest>,
    ) -> Result<Json<PredictResponse>, ClinicalError> {
        let user = authenticate(&self.app_data.token_service, &auth)?;
        if !user.role.permits(Operation::Predict) {
            return Err(ClinicalError::forbidden());
        }

        let assessment = self.app_data.risk_model.predict(&body.features)?;

        self.app_data
            .patient_store
            .record_prediction(&body.patient_id, assessment.status_label(), assessment.probability)
            .await?;

        tracing::info!(
            patient = %body.patient_id,
            by = %user.id,
            status = assessment.status_label(),
            model_available = assessment.model_available,
            "prediction recorded"
        );

        Ok(Json(PredictResponse {
            prediction: assessment.status_label().to_string(),
            probability: format!("{:.2}%", assessment.probability * 100.0),
            model_available: assessment.model_available,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{ApplicationSettings, SeedAccounts};
    use crate::services::risk_model::{ClassifierArtifact, ModelArtifacts, ScalerArtifact};
    use crate::services::RiskModel;
    use crate::types::internal::auth::Role;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;
    use serde_json::json;
    use std::collections::HashMap;

    async fn setup_app_data() -> Arc<AppData> {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let upload_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = ApplicationSettings {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: "test-secret-key-minimum-32-characters-long".to_string(),
            refresh_token_secret: "test-refresh-secret-minimum-32-chars".to_string(),
            password_pepper: "test-pepper-for-api-tests-0123456789".to_string(),
            upload_dir: upload_dir.into_path(),
            // Deliberately unresolvable so the fallback path is exercised
            model_assets_dir: "model_assets_missing".into(),
            seed_accounts: SeedAccounts::default(),
        };

        let app_data = Arc::new(AppData::init(settings, db).expect("Failed to init app data"));

        app_data
            .patient_store
            .create("p1", "Jane Doe", 30, "hash".to_string())
            .await
            .expect("Failed to create test patient");

        app_data
    }

    /// Same AppData, but with a tiny genuine classifier wired in
    async fn with_loaded_model(app_data: Arc<AppData>) -> Arc<AppData> {
        let artifacts = ModelArtifacts {
            classifier: ClassifierArtifact {
                coefficients: vec![2.0, 1.0],
                intercept: -0.5,
            },
            scaler: ScalerArtifact {
                mean: vec![30.0, 5.0, 4.0, 1.0, 0.5],
                scale: vec![10.0, 4.0, 3.0, 2.0, 1.0],
            },
            selected_features: vec![0, 1],
            feature_names: vec![
                "Age".to_string(),
                "Smokes (years)".to_string(),
                "Hormonal Contraceptives (years)".to_string(),
                "IUD (years)".to_string(),
                "STDs (number)".to_string(),
            ],
        };

        Arc::new(AppData {
            risk_model: Arc::new(RiskModel::from_artifacts(artifacts)),
            settings: app_data.settings.clone(),
            db: app_data.db.clone(),
            credential_store: app_data.credential_store.clone(),
            patient_store: app_data.patient_store.clone(),
            image_store: app_data.image_store.clone(),
            token_service: app_data.token_service.clone(),
            registration_validator: crate::services::RegistrationValidator::new(),
        })
    }

    async fn bearer_for(app_data: &Arc<AppData>, id: &str, role: Role) -> BearerAuth {
        let token = app_data
            .token_service
            .generate_jwt(id, id, role)
            .expect("Failed to generate token");
        BearerAuth(poem_openapi::auth::Bearer { token })
    }

    fn predict_request(patient_id: &str) -> Json<PredictRequest> {
        let mut features: HashMap<String, serde_json::Value> = HashMap::new();
        features.insert("Age".to_string(), json!("34"));
        features.insert("Smokes (years)".to_string(), json!("5"));
        Json(PredictRequest {
            patient_id: patient_id.to_string(),
            features,
        })
    }

    #[tokio::test]
    async fn test_fallback_prediction_is_flagged_and_persisted() {
        let app_data = setup_app_data().await;
        let api = PredictApi::new(app_data.clone());

        let auth = bearer_for(&app_data, "doctor1", Role::Doctor).await;
        let response = api.predict(auth, predict_request("p1")).await.unwrap();

        assert_eq!(response.prediction, "High Risk");
        assert_eq!(response.probability, "85.00%");
        assert!(!response.model_available);

        let bundle = app_data.patient_store.get("p1").await.unwrap().unwrap();
        assert_eq!(bundle.record.risk_status, "High Risk");
        assert_eq!(bundle.record.last_probability, "85.0%");
    }

    #[tokio::test]
    async fn test_predict_is_idempotent_for_identical_inputs() {
        let app_data = with_loaded_model(setup_app_data().await).await;
        let api = PredictApi::new(app_data.clone());

        let auth = bearer_for(&app_data, "doctor1", Role::Doctor).await;
        let first = api.predict(auth, predict_request("p1")).await.unwrap();

        let auth = bearer_for(&app_data, "doctor1", Role::Doctor).await;
        let second = api.predict(auth, predict_request("p1")).await.unwrap();

        assert_eq!(first.prediction, second.prediction);
        assert_eq!(first.probability, second.probability);
        assert!(first.model_available);
    }

    #[tokio::test]
    async fn test_predict_any_authenticated_role_is_allowed() {
        let app_data = setup_app_data().await;
        let api = PredictApi::new(app_data.clone());

        for role in [Role::Admin, Role::Doctor, Role::Radiologist, Role::Patient] {
            let auth = bearer_for(&app_data, "caller", role).await;
            assert!(api.predict(auth, predict_request("p1")).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_predict_rejects_unauthenticated_caller() {
        let app_data = setup_app_data().await;
        let api = PredictApi::new(app_data);

        let auth = BearerAuth(poem_openapi::auth::Bearer {
            token: "garbage".to_string(),
        });
        let result = api.predict(auth, predict_request("p1")).await;
        assert!(matches!(result, Err(ClinicalError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_predict_unknown_patient_is_structured_not_found() {
        let app_data = setup_app_data().await;
        let api = PredictApi::new(app_data.clone());

        let auth = bearer_for(&app_data, "doctor1", Role::Doctor).await;
        let result = api.predict(auth, predict_request("ghost")).await;
        assert!(matches!(result, Err(ClinicalError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_predict_with_real_model_overwrites_previous_status() {
        let app_data = with_loaded_model(setup_app_data().await).await;
        let api = PredictApi::new(app_data.clone());

        // High-risk inputs: both selected features far above their means
        let mut high: HashMap<String, serde_json::Value> = HashMap::new();
        high.insert("Age".to_string(), json!(70));
        high.insert("Smokes (years)".to_string(), json!(30));
        let auth = bearer_for(&app_data, "doctor1", Role::Doctor).await;
        let response = api
            .predict(
                auth,
                Json(PredictRequest {
                    patient_id: "p1".to_string(),
                    features: high,
                }),
            )
            .await
            .unwrap();
        assert_eq!(response.prediction, "High Risk");

        // Low-risk inputs flip the stored status
        let mut low: HashMap<String, serde_json::Value> = HashMap::new();
        low.insert("Age".to_string(), json!(20));
        low.insert("Smokes (years)".to_string(), json!(0));
        let auth = bearer_for(&app_data, "doctor1", Role::Doctor).await;
        let response = api
            .predict(
                auth,
                Json(PredictRequest {
                    patient_id: "p1".to_string(),
                    features: low,
                }),
            )
            .await
            .unwrap();
        assert_eq!(response.prediction, "Low Risk");
        assert!(response.model_available);

        let bundle = app_data.patient_store.get("p1").await.unwrap().unwrap();
        assert_eq!(bundle.record.risk_status, "Low Risk");
    }

    #[tokio::test]
    async fn test_predict_coerces_malformed_features_instead_of_failing() {
        let app_data = with_loaded_model(setup_app_data().await).await;
        let api = PredictApi::new(app_data.clone());

        let mut features: HashMap<String, serde_json::Value> = HashMap::new();
        features.insert("Age".to_string(), json!("not a number"));
        features.insert("Unknown Feature".to_string(), json!(123));

        let auth = bearer_for(&app_data, "doctor1", Role::Doctor).await;
        let result = api
            .predict(
                auth,
                Json(PredictRequest {
                    patient_id: "p1".to_string(),
                    features,
                }),
            )
            .await;

        assert!(result.is_ok());
    }
}
