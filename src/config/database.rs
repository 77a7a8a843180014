use crate::errors::internal::InternalError;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

/// Connect to the configured database
///
/// Does NOT run migrations - call `migrate()` separately.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, InternalError> {
    tracing::info!("Connecting to database");
    Database::connect(database_url)
        .await
        .map_err(|e| InternalError::database("connect", e))
}

/// Bring the schema up to date
pub async fn migrate(db: &DatabaseConnection) -> Result<(), InternalError> {
    Migrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("migrate", e))?;
    tracing::info!("Database migrations completed");
    Ok(())
}
