// Public modules
pub mod auth;
pub mod config;
pub mod domains;
pub mod errors;
pub mod globals;
pub mod i18n;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

pub use config::AppConfig;
pub use i18n::Translations;

/// Initialize the library: open the database, apply pending migrations and
/// build the services. Must be called before any service accessor.
pub async fn initialize(config: &AppConfig) -> errors::ServiceResult<()> {
    globals::initialize(config).await
}

/// Get a reference to the SQLite connection pool
/// This is primarily for internal use
pub fn get_db_pool() -> errors::ServiceResult<sqlx::SqlitePool> {
    globals::get_db_pool()
}

