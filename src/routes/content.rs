//! `GET /content/{ref}` - document download for the editing server
//!
//! The ref is the percent-encoded node ref, exactly as emitted in
//! descriptor `document.url` fields.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::HeaderValue;
use hyper::{header, Response, StatusCode};
use tracing::{debug, warn};

use super::prepare::error_response;
use crate::document::{mime, DocumentRef};
use crate::services::ContentStore;
use crate::types::PrepareError;

/// Handle `GET /content/{ref}`
pub async fn handle_content(store: &dyn ContentStore, encoded_ref: &str) -> Response<Full<Bytes>> {
    let node = match urlencoding::decode(encoded_ref) {
        Ok(decoded) if !decoded.is_empty() => DocumentRef::new(decoded.into_owned()),
        _ => {
            return error_response(PrepareError::InvalidRequest(format!(
                "Invalid content ref: {}",
                encoded_ref
            )))
        }
    };

    let properties = match store.properties(&node).await {
        Ok(properties) => properties,
        Err(e) => return error_response(e.into()),
    };
    let data = match store.read(&node).await {
        Ok(data) => data,
        Err(e) => return error_response(e.into()),
    };

    let content_type = HeaderValue::from_str(&properties.mime_type).unwrap_or_else(|_| {
        warn!("Unusable MIME type {:?} on {}", properties.mime_type, node);
        HeaderValue::from_static(mime::OCTET_STREAM)
    });
    debug!("Serving {} ({} bytes)", node, data.len());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, data.len())
        .body(Full::new(data))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryContentStore;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_serves_content() {
        let store = InMemoryContentStore::new("http://gateway.local");
        let folder = store.add_container("my docs");
        store.add_document(&folder, "a.txt", "text/plain", "hello");

        let response = handle_content(&store, "my%20docs%2Fa.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_bad_mime_falls_back_to_octet_stream() {
        let store = InMemoryContentStore::new("http://gateway.local");
        let folder = store.add_container("docs");
        store.add_document(&folder, "a.txt", "text/plain;\u{1}", "hello");

        let response = handle_content(&store, "docs%2Fa.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            mime::OCTET_STREAM
        );
    }

    #[tokio::test]
    async fn test_missing_content() {
        let store = InMemoryContentStore::new("http://gateway.local");
        let response = handle_content(&store, "nope.txt").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
