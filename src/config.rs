use crate::errors::{ServiceError, ServiceResult};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://migrant_records.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123";

/// Runtime settings read from the environment (and `.env`, when present)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub default_language: String,
    /// Enables the "View full record" line in QR payloads
    pub public_base_url: Option<String>,
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            default_language: DEFAULT_LANGUAGE.to_string(),
            public_base_url: None,
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment after loading `.env`
    pub fn from_env() -> ServiceResult<Self> {
        if let Ok(path) = dotenv::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ServiceError::Configuration(format!(
                        "DB_MAX_CONNECTIONS must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            None => defaults.db_max_connections,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections,
            default_language: get("DEFAULT_LANGUAGE").unwrap_or(defaults.default_language),
            public_base_url: get("PUBLIC_BASE_URL"),
            admin_username: get("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_email: get("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password: get("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.public_base_url, None);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DB_MAX_CONNECTIONS", "1"),
            ("DEFAULT_LANGUAGE", "ml"),
            ("PUBLIC_BASE_URL", "https://records.example.org"),
            ("ADMIN_PASSWORD", "   "),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.db_max_connections, 1);
        assert_eq!(config.default_language, "ml");
        assert_eq!(config.public_base_url.as_deref(), Some("https://records.example.org"));
        assert_eq!(config.admin_password, DEFAULT_ADMIN_PASSWORD);
    }

    #[test]
    fn test_bad_pool_size() {
        for bad in ["zero", "0", "-3"] {
            assert!(matches!(
                AppConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", bad)])),
                Err(ServiceError::Configuration(_))
            ));
        }
    }
}
