//! Localization catalog
//!
//! Messages live in per-locale bundles. A lookup that misses the requested
//! bundle falls through to the default bundle before giving up.

use std::collections::HashMap;
use std::path::Path;

use crate::document::DEFAULT_LOCALE;
use crate::types::{PrepareError, Result};

/// Prefix of the keys holding base filenames for new documents
pub const NEW_DOCUMENT_KEY_PREFIX: &str = "onlyoffice.newdoc-filename-";

/// Catalog key for the base filename of a new document with `extension`
pub fn new_document_key(extension: &str) -> String {
    format!("{}{}", NEW_DOCUMENT_KEY_PREFIX, extension)
}

/// Trait for resolving message keys to localized strings
#[async_trait::async_trait]
pub trait MessageCatalog: Send + Sync {
    async fn message(&self, key: &str, locale: &str) -> Option<String>;
}

const BUILTIN_BUNDLES: &[(&str, &[(&str, &str)])] = &[
    (
        "en",
        &[
            ("docx", "New document"),
            ("xlsx", "New spreadsheet"),
            ("pptx", "New presentation"),
        ],
    ),
    (
        "de",
        &[
            ("docx", "Neues Dokument"),
            ("xlsx", "Neue Tabelle"),
            ("pptx", "Neue Präsentation"),
        ],
    ),
    (
        "es",
        &[
            ("docx", "Nuevo documento"),
            ("xlsx", "Nueva hoja de cálculo"),
            ("pptx", "Nueva presentación"),
        ],
    ),
    (
        "fr",
        &[
            ("docx", "Nouveau document"),
            ("xlsx", "Nouveau classeur"),
            ("pptx", "Nouvelle présentation"),
        ],
    ),
    (
        "it",
        &[
            ("docx", "Nuovo documento"),
            ("xlsx", "Nuovo foglio di calcolo"),
            ("pptx", "Nuova presentazione"),
        ],
    ),
    (
        "ru",
        &[
            ("docx", "Новый документ"),
            ("xlsx", "Новая таблица"),
            ("pptx", "Новая презентация"),
        ],
    ),
];

/// In-memory message bundles keyed by locale code
#[derive(Debug, Clone)]
pub struct BundleCatalog {
    default_locale: String,
    bundles: HashMap<String, HashMap<String, String>>,
}

impl BundleCatalog {
    /// Empty catalog
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            bundles: HashMap::new(),
        }
    }

    /// Catalog seeded with the built-in new-document names
    pub fn builtin() -> Self {
        let mut catalog = Self::new(DEFAULT_LOCALE);
        for (locale, entries) in BUILTIN_BUNDLES {
            for (ext, name) in *entries {
                catalog.insert(locale, new_document_key(ext), *name);
            }
        }
        catalog
    }

    pub fn insert(&mut self, locale: &str, key: impl Into<String>, value: impl Into<String>) {
        self.bundles
            .entry(locale.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Overlay bundles from a JSON object of `{ locale: { key: message } }`
    pub fn merge_json_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PrepareError::Config(format!("Cannot read messages file {}: {}", path.display(), e))
        })?;
        let overlay: HashMap<String, HashMap<String, String>> = serde_json::from_str(&raw)
            .map_err(|e| {
                PrepareError::Config(format!("Invalid messages file {}: {}", path.display(), e))
            })?;

        for (locale, entries) in overlay {
            for (key, value) in entries {
                self.insert(&locale, key, value);
            }
        }
        Ok(())
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&String> {
        self.bundles.get(locale).and_then(|bundle| bundle.get(key))
    }
}

#[async_trait::async_trait]
impl MessageCatalog for BundleCatalog {
    async fn message(&self, key: &str, locale: &str) -> Option<String> {
        self.lookup(locale, key)
            .or_else(|| self.lookup(&self.default_locale, key))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_names() {
        let catalog = BundleCatalog::builtin();
        assert_eq!(
            catalog.message(&new_document_key("xlsx"), "en").await.as_deref(),
            Some("New spreadsheet")
        );
        assert_eq!(
            catalog.message(&new_document_key("docx"), "de").await.as_deref(),
            Some("Neues Dokument")
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_default_bundle() {
        let mut catalog = BundleCatalog::new("en");
        catalog.insert("en", "greeting", "Hello");
        assert_eq!(
            catalog.message("greeting", "fr").await.as_deref(),
            Some("Hello")
        );
        assert_eq!(catalog.message("missing", "en").await, None);
    }

    #[tokio::test]
    async fn test_merge_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        std::fs::write(
            &path,
            r#"{"en": {"onlyoffice.newdoc-filename-odt": "New text"}, "fr": {"onlyoffice.newdoc-filename-docx": "Document"}}"#,
        )
        .unwrap();

        let mut catalog = BundleCatalog::builtin();
        catalog.merge_json_file(&path).unwrap();

        assert_eq!(
            catalog.message(&new_document_key("odt"), "it").await.as_deref(),
            Some("New text")
        );
        assert_eq!(
            catalog.message(&new_document_key("docx"), "fr").await.as_deref(),
            Some("Document")
        );
    }
}
