use crate::config::settings::ApplicationSettings;
use crate::errors::internal::InternalError;
use crate::services::{RegistrationValidator, RiskModel, TokenService};
use crate::stores::{CredentialStore, ImageStore, PatientStore};
use crate::types::internal::auth::Role;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across API
/// endpoints behind an Arc. There is no global mutable state: the loaded
/// classifier (or its absence) and the settings live here and are passed
/// explicitly to every handler.
pub struct AppData {
    pub settings: ApplicationSettings,
    pub db: DatabaseConnection,
    pub credential_store: Arc<CredentialStore>,
    pub patient_store: Arc<PatientStore>,
    pub image_store: Arc<ImageStore>,
    pub token_service: Arc<TokenService>,
    pub registration_validator: RegistrationValidator,
    pub risk_model: Arc<RiskModel>,
}

impl AppData {
    /// Initialize all application data
    ///
    /// The database should be connected and migrated before calling this.
    /// Classifier artifacts that fail to load leave the risk model in its
    /// flagged fallback mode rather than failing startup.
    pub fn init(
        settings: ApplicationSettings,
        db: DatabaseConnection,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        let credential_store = Arc::new(CredentialStore::new(
            db.clone(),
            settings.password_pepper.clone(),
        ));
        let patient_store = Arc::new(PatientStore::new(db.clone()));
        let image_store = Arc::new(ImageStore::new(settings.upload_dir.clone())?);
        let token_service = Arc::new(TokenService::new(
            settings.jwt_secret.clone(),
            settings.refresh_token_secret.clone(),
        ));
        let risk_model = Arc::new(RiskModel::load(&settings.model_assets_dir));

        tracing::info!("AppData initialization complete");

        Ok(Self {
            settings,
            db,
            credential_store,
            patient_store,
            image_store,
            token_service,
            registration_validator: RegistrationValidator::new(),
            risk_model,
        })
    }

    /// Seed the default staff accounts for environments that configure them
    ///
    /// Each account is only written when its password variable is present and
    /// the id is still free; existing rows are never touched.
    pub async fn seed_staff_accounts(&self) -> Result<(), InternalError> {
        let seeds = [
            (
                "admin1",
                "System Admin",
                Role::Admin,
                &self.settings.seed_accounts.admin_password,
            ),
            (
                "doctor1",
                "Dr. Saravana Kumar",
                Role::Doctor,
                &self.settings.seed_accounts.doctor_password,
            ),
            (
                "rad1",
                "Chief Radiologist",
                Role::Radiologist,
                &self.settings.seed_accounts.radiologist_password,
            ),
        ];

        for (id, name, role, password) in seeds {
            if let Some(password) = password {
                let created = self
                    .credential_store
                    .ensure_staff_user(id, name, role, password)
                    .await?;
                if created {
                    tracing::info!(user = id, role = role.as_str(), "seeded staff account");
                }
            }
        }

        Ok(())
    }
}
