//! Error types for editor-prepare
//!
//! Every failure is terminal for the current request. Nothing here is
//! retried; the transport layer decides what to do with the status code.

use hyper::StatusCode;

/// Errors raised by content store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Node already exists: {0}")]
    AlreadyExists(String),

    #[error("Store I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Main error type for descriptor preparation
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unclassified document type: {0:?}")]
    UnclassifiedDocumentType(String),

    #[error("No empty-document template for extension {0:?}")]
    TemplateUnavailable(String),

    #[error("No localized message for key {0:?}")]
    MissingMessage(String),

    #[error("No free name for {base:?} after {attempts} attempts")]
    NameExhausted { base: String, attempts: usize },

    #[error("Signing failure: {0}")]
    Signing(String),

    #[error("Store failure: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PrepareError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::UnclassifiedDocumentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::TemplateUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingMessage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NameExhausted { .. } => StatusCode::INSUFFICIENT_STORAGE,
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind, used as the `error` field of JSON bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::UnclassifiedDocumentType(_) => "unclassified_document_type",
            Self::TemplateUnavailable(_) => "template_unavailable",
            Self::MissingMessage(_) => "missing_message",
            Self::NameExhausted { .. } => "name_exhausted",
            Self::Signing(_) => "signing_failure",
            Self::Store(_) => "store_failure",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Convert to status code and body tuple for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, String) {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, body.to_string())
    }
}

impl From<StoreError> for PrepareError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(node) => Self::NotFound(node),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for PrepareError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Signing(format!("JWT error: {}", err))
    }
}

/// Result type alias for preparation operations
pub type Result<T> = std::result::Result<T, PrepareError>;
