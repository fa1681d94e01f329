//! Public URLs handed to the editing server

use crate::document::DocumentRef;

/// URL layout of a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorUrls {
    /// Endpoint the editor posts saves to; the node ref is appended as
    /// the `nodeRef` query parameter
    pub callback_endpoint: String,
    /// Base URL of the editing server itself
    pub editor_service_url: String,
}

impl EditorUrls {
    pub fn new(callback_endpoint: impl Into<String>, editor_service_url: impl Into<String>) -> Self {
        Self {
            callback_endpoint: callback_endpoint.into(),
            editor_service_url: editor_service_url.into(),
        }
    }

    /// Callback URL for a document
    pub fn callback_url(&self, node: &DocumentRef) -> String {
        let separator = if self.callback_endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}nodeRef={}",
            self.callback_endpoint,
            separator,
            urlencoding::encode(node.as_str())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url() {
        let urls = EditorUrls::new("https://ecm.local/callback", "https://docs.local/");
        assert_eq!(
            urls.callback_url(&DocumentRef::new("folder/Report.docx")),
            "https://ecm.local/callback?nodeRef=folder%2FReport.docx"
        );

        let urls = EditorUrls::new("https://ecm.local/cb?tenant=a", "https://docs.local/");
        assert_eq!(
            urls.callback_url(&DocumentRef::new("x")),
            "https://ecm.local/cb?tenant=a&nodeRef=x"
        );
    }
}
