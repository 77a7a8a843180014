// Config layer - Settings, logging, and database bootstrap
pub mod database;
pub mod logging;
pub mod settings;

pub use settings::{ApplicationSettings, SeedAccounts, SettingsError};
