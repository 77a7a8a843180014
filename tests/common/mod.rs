// Common test utilities for integration tests

use clinirisk_backend::api::BearerAuth;
use clinirisk_backend::config::settings::{ApplicationSettings, SeedAccounts};
use clinirisk_backend::types::internal::auth::Role;
use clinirisk_backend::AppData;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

/// Creates a test database with migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Creates a fully wired AppData over an in-memory database
///
/// The model assets directory is deliberately unresolvable so the risk model
/// starts in its flagged fallback mode; tests that need genuine predictions
/// swap the model in themselves.
pub async fn setup_app_data() -> Arc<AppData> {
    let db = setup_test_db().await;

    let upload_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let settings = ApplicationSettings {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        jwt_secret: "test-secret-key-minimum-32-characters-long".to_string(),
        refresh_token_secret: "test-refresh-secret-minimum-32-chars".to_string(),
        password_pepper: "test-pepper-for-integration-tests-012".to_string(),
        upload_dir: upload_dir.into_path(),
        model_assets_dir: "model_assets_missing".into(),
        seed_accounts: SeedAccounts::default(),
    };

    Arc::new(AppData::init(settings, db).expect("Failed to init app data"))
}

/// Mint a bearer token for the given identity
pub fn bearer_for(app_data: &Arc<AppData>, id: &str, name: &str, role: Role) -> BearerAuth {
    let token = app_data
        .token_service
        .generate_jwt(id, name, role)
        .expect("Failed to generate token");
    BearerAuth(poem_openapi::auth::Bearer { token })
}
