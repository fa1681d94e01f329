//! Session descriptor preparation
//!
//! ```text
//! request ──▶ NewDocumentProvisioner (only with `new=<mime>`)
//!                      │
//!                      ▼
//!             SessionDescriptorBuilder ──▶ TokenSigner (when enabled) ──▶ JSON
//! ```

pub mod descriptor;
pub mod provisioner;
pub mod service;
pub mod token;

pub use descriptor::{
    Customization, DocumentInfo, EditorConfig, EditorKind, EditorMode, EditorUser, Permissions,
    SessionDescriptor, SessionDescriptorBuilder,
};
pub use provisioner::NewDocumentProvisioner;
pub use service::{PrepareDeps, PrepareRequest, PrepareService};
pub use token::TokenSigner;
