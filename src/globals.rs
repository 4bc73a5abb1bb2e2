use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::db_migration;
use crate::domains::analytics::{AnalyticsService, AnalyticsServiceImpl};
use crate::domains::migrant::{MigrantService, MigrantServiceImpl};
use crate::errors::{ServiceError, ServiceResult};
use crate::i18n::Translations;
use lazy_static::lazy_static;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// Global state definitions
lazy_static! {
    static ref INIT_MUTEX: tokio::sync::Mutex<()> = tokio::sync::Mutex::new(());
    static ref INITIALIZED: AtomicBool = AtomicBool::new(false);

    static ref DB_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);
    static ref AUTH_SERVICE: Mutex<Option<Arc<AuthService>>> = Mutex::new(None);
    static ref MIGRANT_SERVICE: Mutex<Option<Arc<dyn MigrantService>>> = Mutex::new(None);
    static ref ANALYTICS_SERVICE: Mutex<Option<Arc<dyn AnalyticsService>>> = Mutex::new(None);
    static ref TRANSLATIONS: Mutex<Option<Arc<Translations>>> = Mutex::new(None);
}

fn not_initialized(name: &str) -> ServiceError {
    ServiceError::Configuration(format!("{} not initialized", name))
}

fn poisoned(name: &str) -> ServiceError {
    ServiceError::Configuration(format!("{} lock poisoned", name))
}

pub fn get_db_pool() -> ServiceResult<SqlitePool> {
    DB_POOL.lock().map_err(|_| poisoned("DB_POOL"))?.clone().ok_or_else(|| not_initialized("Database pool"))
}
pub fn get_auth_service() -> ServiceResult<Arc<AuthService>> {
    AUTH_SERVICE.lock().map_err(|_| poisoned("AUTH_SERVICE"))?.clone().ok_or_else(|| not_initialized("AuthService"))
}
pub fn get_migrant_service() -> ServiceResult<Arc<dyn MigrantService>> {
    MIGRANT_SERVICE.lock().map_err(|_| poisoned("MIGRANT_SERVICE"))?.clone().ok_or_else(|| not_initialized("MigrantService"))
}
pub fn get_analytics_service() -> ServiceResult<Arc<dyn AnalyticsService>> {
    ANALYTICS_SERVICE.lock().map_err(|_| poisoned("ANALYTICS_SERVICE"))?.clone().ok_or_else(|| not_initialized("AnalyticsService"))
}

/// UI label tables with the configured default language applied
pub fn get_translations() -> ServiceResult<Arc<Translations>> {
    TRANSLATIONS.lock().map_err(|_| poisoned("TRANSLATIONS"))?.clone().ok_or_else(|| not_initialized("Translations"))
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Open the database, apply migrations and wire the services.
/// Later calls are no-ops once a call has succeeded.
pub async fn initialize(config: &AppConfig) -> ServiceResult<()> {
    // Acquire the async mutex to ensure single initialization
    let _guard = INIT_MUTEX.lock().await;

    if INITIALIZED.load(Ordering::Acquire) {
        log::debug!("Already initialized, skipping");
        return Ok(());
    }

    let result = initialize_internal(config).await;

    // Mark as initialized only if successful
    if result.is_ok() {
        INITIALIZED.store(true, Ordering::Release);
    }

    result
}

async fn initialize_internal(config: &AppConfig) -> ServiceResult<()> {
    log::info!("Starting initialization");
    log::debug!("Database URL: {}", config.database_url);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| ServiceError::Configuration(format!("Database connection failed: {}", e)))?;

    db_migration::run_migrations(&pool).await?;

    let translations = Arc::new(Translations::load()?.with_default_language(&config.default_language));
    log::debug!("Default language: {}", translations.default_language());

    let auth_service: Arc<AuthService> = Arc::new(AuthService::new(pool.clone()));
    let migrant_service: Arc<dyn MigrantService> =
        Arc::new(MigrantServiceImpl::new(pool.clone(), config.public_base_url.clone()));
    let analytics_service: Arc<dyn AnalyticsService> = Arc::new(AnalyticsServiceImpl::new(pool.clone()));

    *DB_POOL.lock().map_err(|_| poisoned("DB_POOL"))? = Some(pool);
    *AUTH_SERVICE.lock().map_err(|_| poisoned("AUTH_SERVICE"))? = Some(auth_service);
    *MIGRANT_SERVICE.lock().map_err(|_| poisoned("MIGRANT_SERVICE"))? = Some(migrant_service);
    *ANALYTICS_SERVICE.lock().map_err(|_| poisoned("ANALYTICS_SERVICE"))? = Some(analytics_service);
    *TRANSLATIONS.lock().map_err(|_| poisoned("TRANSLATIONS"))? = Some(translations);

    log::info!("Initialization complete");
    Ok(())
}
