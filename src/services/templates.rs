//! Empty-document templates
//!
//! Templates are keyed by extension and locale. Filesystem layout:
//!
//! ```text
//! <root>/en/new.docx
//! <root>/en/new.xlsx
//! <root>/de/new.docx
//! ...
//! ```

use bytes::Bytes;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Trait for loading blank documents used to seed new nodes
#[async_trait::async_trait]
pub trait TemplateSource: Send + Sync {
    /// Template for `extension` in `locale`, falling back to the default
    /// locale. `None` when neither has one.
    async fn empty_document_template(&self, extension: &str, locale: &str) -> Option<Bytes>;
}

/// Templates read from a directory tree
pub struct FsTemplateSource {
    root: PathBuf,
    default_locale: String,
}

impl FsTemplateSource {
    pub fn new(root: impl Into<PathBuf>, default_locale: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            default_locale: default_locale.into(),
        }
    }

    async fn load(&self, extension: &str, locale: &str) -> Option<Bytes> {
        if extension.contains(['/', '\\', '.']) || locale.contains(['/', '\\', '.']) {
            return None;
        }
        let path = self.root.join(locale).join(format!("new.{}", extension));
        match tokio::fs::read(&path).await {
            Ok(data) => Some(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read template {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl TemplateSource for FsTemplateSource {
    async fn empty_document_template(&self, extension: &str, locale: &str) -> Option<Bytes> {
        if let Some(data) = self.load(extension, locale).await {
            return Some(data);
        }
        if locale != self.default_locale {
            debug!(
                "No {} template for locale {}, trying {}",
                extension, locale, self.default_locale
            );
            return self.load(extension, &self.default_locale).await;
        }
        None
    }
}

/// Templates held in memory
#[derive(Debug, Default)]
pub struct InMemoryTemplateSource {
    default_locale: String,
    templates: HashMap<(String, String), Bytes>,
}

impl InMemoryTemplateSource {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            templates: HashMap::new(),
        }
    }

    pub fn with_template(
        mut self,
        extension: &str,
        locale: &str,
        content: impl Into<Bytes>,
    ) -> Self {
        self.templates
            .insert((extension.to_string(), locale.to_string()), content.into());
        self
    }

    fn get(&self, extension: &str, locale: &str) -> Option<Bytes> {
        self.templates
            .get(&(extension.to_string(), locale.to_string()))
            .cloned()
    }
}

#[async_trait::async_trait]
impl TemplateSource for InMemoryTemplateSource {
    async fn empty_document_template(&self, extension: &str, locale: &str) -> Option<Bytes> {
        self.get(extension, locale)
            .or_else(|| self.get(extension, &self.default_locale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_template_with_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("en")).unwrap();
        std::fs::create_dir_all(dir.path().join("de")).unwrap();
        std::fs::write(dir.path().join("en/new.docx"), b"en-docx").unwrap();
        std::fs::write(dir.path().join("en/new.xlsx"), b"en-xlsx").unwrap();
        std::fs::write(dir.path().join("de/new.docx"), b"de-docx").unwrap();

        let source = FsTemplateSource::new(dir.path(), "en");

        let de = source.empty_document_template("docx", "de").await.unwrap();
        assert_eq!(&de[..], b"de-docx");

        let fallback = source.empty_document_template("xlsx", "de").await.unwrap();
        assert_eq!(&fallback[..], b"en-xlsx");

        assert!(source.empty_document_template("pptx", "de").await.is_none());
    }

    #[tokio::test]
    async fn test_fs_template_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsTemplateSource::new(dir.path(), "en");
        assert!(source
            .empty_document_template("docx", "../../etc")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_memory_template_fallback() {
        let source = InMemoryTemplateSource::new("en").with_template("pptx", "en", "blank");
        let data = source.empty_document_template("pptx", "ru").await.unwrap();
        assert_eq!(&data[..], b"blank");
        assert!(source.empty_document_template("docx", "en").await.is_none());
    }
}
