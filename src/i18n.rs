use crate::errors::{ServiceError, ServiceResult};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// Label table for one language, keyed by label id
pub type LanguageTable = HashMap<String, String>;

const EMBEDDED_TRANSLATIONS: &str = include_str!("../locales/translations.json");

static EMPTY_TABLE: Lazy<LanguageTable> = Lazy::new(HashMap::new);

#[derive(Debug, Deserialize)]
struct TranslationFile {
    default: String,
    languages: HashMap<String, LanguageTable>,
}

/// Immutable UI label tables, loaded once at startup and handed to the
/// presentation layer. Unknown language codes fall back to the default.
#[derive(Debug, Clone)]
pub struct Translations {
    default_language: String,
    languages: HashMap<String, LanguageTable>,
}

impl Translations {
    /// Load the tables compiled into the binary
    pub fn load() -> ServiceResult<Self> {
        Self::from_json(EMBEDDED_TRANSLATIONS)
    }

    pub fn from_json(json: &str) -> ServiceResult<Self> {
        let file: TranslationFile = serde_json::from_str(json)
            .map_err(|e| ServiceError::Configuration(format!("Invalid translations file: {}", e)))?;

        if !file.languages.contains_key(&file.default) {
            return Err(ServiceError::Configuration(format!(
                "Default language '{}' has no translation table",
                file.default
            )));
        }

        log::debug!("Loaded translations for {} languages", file.languages.len());
        Ok(Self {
            default_language: file.default,
            languages: file.languages,
        })
    }

    /// Use `code` as the fallback language when a table exists for it
    pub fn with_default_language(mut self, code: &str) -> Self {
        if self.languages.contains_key(code) {
            self.default_language = code.to_string();
        } else {
            log::warn!(
                "No translations for configured default language '{}', keeping '{}'",
                code,
                self.default_language
            );
        }
        self
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Available language codes, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn supports(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    /// Table for the requested language, or the default table
    pub fn resolve(&self, code: Option<&str>) -> &LanguageTable {
        code.and_then(|c| self.languages.get(c))
            .or_else(|| self.languages.get(&self.default_language))
            .unwrap_or(&*EMPTY_TABLE)
    }

    /// Single label. A key missing from the requested language falls back to
    /// the default language.
    pub fn get(&self, code: Option<&str>, key: &str) -> Option<&str> {
        self.resolve(code)
            .get(key)
            .or_else(|| self.languages.get(&self.default_language).and_then(|t| t.get(key)))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_tables_load() {
        let translations = Translations::load().unwrap();
        assert_eq!(translations.default_language(), "en");
        assert_eq!(translations.languages(), vec!["bn", "en", "hi", "ml", "ta"]);

        let english = translations.resolve(Some("en"));
        for (code, table) in &translations.languages {
            assert_eq!(table.len(), english.len(), "language {} is missing labels", code);
        }
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let translations = Translations::load().unwrap();
        assert_eq!(translations.get(Some("fr"), "search"), Some("Search"));
        assert_eq!(translations.get(None, "search_by_id"), Some("Search by ID"));
        assert_eq!(translations.get(Some("hi"), "age"), Some("आयु"));
        assert_eq!(translations.get(Some("en"), "no_such_label"), None);
    }

    #[test]
    fn test_missing_key_uses_default_language() {
        let json = r#"{"default":"en","languages":{"en":{"save":"Save","age":"Age"},"ml":{"age":"പ്രായം"}}}"#;
        let translations = Translations::from_json(json).unwrap();
        assert_eq!(translations.get(Some("ml"), "save"), Some("Save"));
        assert_eq!(translations.get(Some("ml"), "age"), Some("പ്രായം"));
    }

    #[test]
    fn test_configured_default_language() {
        let translations = Translations::load().unwrap().with_default_language("ml");
        assert_eq!(translations.default_language(), "ml");
        assert!(translations.supports("ta"));

        let unchanged = Translations::load().unwrap().with_default_language("xx");
        assert_eq!(unchanged.default_language(), "en");
    }

    #[test]
    fn test_bad_default_is_rejected() {
        let json = r#"{"default":"fr","languages":{"en":{"save":"Save"}}}"#;
        assert!(matches!(
            Translations::from_json(json),
            Err(ServiceError::Configuration(_))
        ));
    }
}
