//! Document model: references, properties, and the pure helpers that
//! classify, name, and localize documents.

pub mod doc_type;
pub mod locale;
pub mod mime;
pub mod naming;

pub use doc_type::{classify, extension_of, DocumentType, Unclassified};
pub use locale::{from_accept_language, LocaleResolver, DEFAULT_LOCALE, SUPPORTED_LOCALES};

use serde::{Deserialize, Serialize};

/// Opaque identifier for a stored document or container
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Properties read from the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProperties {
    pub title: String,
    pub mime_type: String,
}

/// The current user as known to the identity directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl UserIdentity {
    /// Identity carrying only an id
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: None,
            last_name: None,
        }
    }

    /// `"first last"` when both names are known, otherwise the raw id
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => self.id.clone(),
        }
    }
}
