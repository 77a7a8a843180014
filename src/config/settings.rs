use std::env;
use std::path::PathBuf;

/// Optional seed passwords for the three staff accounts
///
/// Seeding only runs for accounts whose password variable is present; the
/// values pass through the same Argon2id hashing as every other credential
/// and are never logged.
#[derive(Clone, Default)]
pub struct SeedAccounts {
    pub admin_password: Option<String>,
    pub doctor_password: Option<String>,
    pub radiologist_password: Option<String>,
}

impl SeedAccounts {
    pub fn from_env() -> Self {
        Self {
            admin_password: env::var("SEED_ADMIN_PASSWORD").ok(),
            doctor_password: env::var("SEED_DOCTOR_PASSWORD").ok(),
            radiologist_password: env::var("SEED_RADIOLOGIST_PASSWORD").ok(),
        }
    }
}

impl std::fmt::Debug for SeedAccounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAccounts")
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("doctor_password", &self.doctor_password.as_ref().map(|_| "<redacted>"))
            .field(
                "radiologist_password",
                &self.radiologist_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Application settings loaded once at startup and carried in AppData
///
/// There is no global mutable configuration; handlers only ever see this
/// struct through the shared application context.
#[derive(Clone)]
pub struct ApplicationSettings {
    /// Database connection string (SQLite file by default, Postgres in deployment)
    pub database_url: String,

    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// Secret for signing access tokens
    pub jwt_secret: String,

    /// Secret for hashing refresh tokens at rest
    pub refresh_token_secret: String,

    /// Server-side pepper mixed into every password hash
    pub password_pepper: String,

    /// Directory uploaded biopsy files are stored in
    pub upload_dir: PathBuf,

    /// Directory the classifier artifacts are read from
    pub model_assets_dir: PathBuf,

    /// Seed passwords for the default staff accounts
    pub seed_accounts: SeedAccounts,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Missing required environment variable: {0}")]
    MissingVariable(&'static str),

    #[error("Secret {0} must be at least {1} characters")]
    SecretTooShort(&'static str, usize),
}

impl ApplicationSettings {
    /// Load settings from the environment
    ///
    /// Secrets are required and length-checked; everything else has a local
    /// development default.
    pub fn from_env() -> Result<Self, SettingsError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://clinirisk.db?mode=rwc".to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let jwt_secret = require_secret("JWT_SECRET")?;
        let refresh_token_secret = require_secret("REFRESH_TOKEN_SECRET")?;
        let password_pepper = require_secret("PASSWORD_PEPPER")?;

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        let model_assets_dir = env::var("MODEL_ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("model_assets"));

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            refresh_token_secret,
            password_pepper,
            upload_dir,
            model_assets_dir,
            seed_accounts: SeedAccounts::from_env(),
        })
    }
}

const MIN_SECRET_LENGTH: usize = 32;

fn require_secret(name: &'static str) -> Result<String, SettingsError> {
    let value = env::var(name).map_err(|_| SettingsError::MissingVariable(name))?;
    validate_secret(name, value)
}

fn validate_secret(name: &'static str, value: String) -> Result<String, SettingsError> {
    if value.len() < MIN_SECRET_LENGTH {
        return Err(SettingsError::SecretTooShort(name, MIN_SECRET_LENGTH));
    }
    Ok(value)
}

impl std::fmt::Debug for ApplicationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationSettings")
            .field("database_url", &self.database_url)
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("refresh_token_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("upload_dir", &self.upload_dir)
            .field("model_assets_dir", &self.model_assets_dir)
            .field("seed_accounts", &self.seed_accounts)
            .finish()
    }
}
