//! Document type classification
//!
//! Maps a file extension to the editor family that opens it. Matching is
//! exact set membership on the lower-cased extension.

use serde::{Deserialize, Serialize};

const TEXT_EXTENSIONS: &[&str] = &[
    "doc", "docx", "docm", "dot", "dotx", "dotm", "odt", "fodt", "ott", "rtf", "txt", "html",
    "htm", "mht", "pdf", "djvu", "fb2", "epub", "xps",
];

const SPREADSHEET_EXTENSIONS: &[&str] = &[
    "xls", "xlsx", "xlsm", "xlt", "xltx", "xltm", "ods", "fods", "ots", "csv",
];

const PRESENTATION_EXTENSIONS: &[&str] = &[
    "pps", "ppsx", "ppsm", "ppt", "pptx", "pptm", "pot", "potx", "potm", "odp", "fodp", "otp",
];

/// Editor family for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Text,
    Spreadsheet,
    Presentation,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Spreadsheet => "spreadsheet",
            Self::Presentation => "presentation",
        }
    }

    /// Known extensions for this family
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Text => TEXT_EXTENSIONS,
            Self::Spreadsheet => SPREADSHEET_EXTENSIONS,
            Self::Presentation => PRESENTATION_EXTENSIONS,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension did not belong to any known family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unclassified(pub String);

/// Classify an extension. First matching family wins.
pub fn classify(extension: &str) -> Result<DocumentType, Unclassified> {
    let ext = extension.trim().to_ascii_lowercase();

    [
        DocumentType::Text,
        DocumentType::Spreadsheet,
        DocumentType::Presentation,
    ]
    .into_iter()
    .find(|family| family.extensions().contains(&ext.as_str()))
    .ok_or(Unclassified(ext))
}

/// Extension of a title: text after the last `.`, trimmed and lower-cased.
///
/// Returns `None` when the title has no dot or the extension is empty.
pub fn extension_of(title: &str) -> Option<String> {
    let (_, ext) = title.rsplit_once('.')?;
    let ext = ext.trim().to_ascii_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
