//! editor-prepare - session descriptors for document editing servers
//!
//! Answers "open this document" requests from an embedding frontend with
//! the configuration object the editing server needs: where to fetch the
//! content, where to post saves, who the user is, and a signed token over
//! all of it. Optionally creates a blank document first.
//!
//! ## Modules
//!
//! - **document**: classification, naming, locales, MIME mapping
//! - **services**: content store, identity directory, message catalog,
//!   and template traits with their bundled backends
//! - **prepare**: provisioning, descriptor assembly, signing
//! - **server** / **routes**: the HTTP surface

pub mod config;
pub mod document;
pub mod prepare;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use prepare::{PrepareRequest, PrepareService, SessionDescriptor};
pub use server::{run, AppState};
pub use types::{PrepareError, Result};
