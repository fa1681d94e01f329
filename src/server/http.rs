//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Args;
use crate::prepare::PrepareService;
use crate::routes;
use crate::services::ContentStore;
use crate::types::PrepareError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Descriptor pipeline
    pub service: PrepareService,
    /// Store used by the content route
    pub store: Arc<dyn ContentStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, service: PrepareService, store: Arc<dyn ContentStore>) -> Self {
        Self {
            args,
            service,
            store,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), PrepareError> {
    let listener = TcpListener::bind(state.args.listen)
        .await
        .map_err(|e| PrepareError::Config(format!("Cannot bind {}: {}", state.args.listen, e)))?;

    info!("editor-prepare listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!(
            "Development mode enabled - requests without {} run as {}",
            state.args.user_header, state.args.dev_user
        );
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    // GET routes only; the body is never read
    let (parts, _body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let span = info_span!("request", id = %Uuid::new_v4(), method = %parts.method, path = %path);

    async move {
        info!("[{}] {} {}", addr, parts.method, path);
        Ok(route(&state, &parts.method, &path, parts.uri.query(), &parts.headers).await)
    }
    .instrument(span)
    .await
}

async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Response<BoxBody> {
    match (method, path) {
        // Health check endpoints
        (&Method::GET, "/health") | (&Method::GET, "/healthz") => {
            to_boxed(routes::health_check(state))
        }

        // CORS preflight
        (&Method::OPTIONS, _) => to_boxed(preflight_response()),

        // Session descriptor
        (&Method::GET, "/prepare") => {
            to_boxed(routes::handle_prepare(&state.service, &state.args, query, headers).await)
        }

        // Document content for the editing server
        (&Method::GET, p) if p.starts_with("/content/") => {
            let encoded = p.strip_prefix("/content/").unwrap_or("");
            to_boxed(routes::handle_content(state.store.as_ref(), encoded).await)
        }

        // Not found
        _ => to_boxed(not_found_response(path)),
    }
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
        "hint": "Use GET /prepare?nodeRef=<ref>"
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
