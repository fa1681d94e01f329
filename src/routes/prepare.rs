//! `GET /prepare` - session descriptor endpoint
//!
//! Query parameters:
//! - `nodeRef` (required): document to open, or the container for `new`
//! - `new` (optional): MIME type of a blank document to create first
//! - `lang` (optional): UI locale, overrides `Accept-Language`

use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, HeaderMap, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Args;
use crate::document::from_accept_language;
use crate::prepare::{PrepareRequest, PrepareService};
use crate::types::PrepareError;

/// JSON content type of descriptor responses
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

#[derive(Debug, Default, Deserialize)]
pub struct PrepareQuery {
    #[serde(rename = "nodeRef")]
    pub node_ref: Option<String>,
    pub new: Option<String>,
    pub lang: Option<String>,
}

/// Parse the query string. Unknown parameters are ignored.
pub fn parse_query(query: Option<&str>) -> Result<PrepareQuery, PrepareError> {
    match query {
        None | Some("") => Ok(PrepareQuery::default()),
        Some(q) => serde_urlencoded::from_str(q)
            .map_err(|e| PrepareError::InvalidRequest(format!("Malformed query string: {}", e))),
    }
}

/// Resolve the authenticated user from the configured header
pub fn user_from_headers(args: &Args, headers: &HeaderMap) -> Result<String, PrepareError> {
    let user = headers
        .get(args.user_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|u| !u.is_empty());

    match user {
        Some(user) => Ok(user.to_string()),
        None if args.dev_mode => Ok(args.dev_user.clone()),
        None => Err(PrepareError::Unauthorized(format!(
            "missing {} header",
            args.user_header
        ))),
    }
}

/// Build the request from query and headers
pub fn prepare_request(
    args: &Args,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Result<PrepareRequest, PrepareError> {
    let params = parse_query(query)?;
    let user_id = user_from_headers(args, headers)?;

    let locale = params
        .lang
        .filter(|l| !l.trim().is_empty())
        .or_else(|| {
            headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .and_then(from_accept_language)
        })
        .unwrap_or_else(|| args.default_locale.clone());

    Ok(PrepareRequest {
        node_ref: params.node_ref,
        new_mime: params.new,
        user_id,
        locale,
    })
}

/// Handle `GET /prepare`
pub async fn handle_prepare(
    service: &PrepareService,
    args: &Args,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Response<Full<Bytes>> {
    let request = match prepare_request(args, query, headers) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    let descriptor = match service.prepare(request).await {
        Ok(descriptor) => descriptor,
        Err(e) => return error_response(e),
    };

    let body = match serde_json::to_string_pretty(&descriptor) {
        Ok(body) => body,
        Err(e) => {
            return error_response(PrepareError::Internal(format!(
                "Unable to serialize JSON: {}",
                e
            )))
        }
    };
    debug!("Sending descriptor: {}", body);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, JSON_UTF8)
        .header(header::CACHE_CONTROL, "no-store")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// JSON error response for a failed request
pub fn error_response(err: PrepareError) -> Response<Full<Bytes>> {
    warn!("Request failed: {}", err);
    let (status, body) = err.into_status_code_and_body();

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, JSON_UTF8)
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
