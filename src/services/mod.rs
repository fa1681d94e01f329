//! Collaborators the preparation core calls through
//!
//! Each concern sits behind a `Send + Sync` trait so deployments can plug
//! in their own repository, directory, or catalog and tests can use the
//! in-memory backends.

pub mod catalog;
pub mod content_store;
pub mod directory;
pub mod templates;
pub mod urls;

pub use catalog::{new_document_key, BundleCatalog, MessageCatalog};
pub use content_store::{ContentStore, FsContentStore, InMemoryContentStore};
pub use directory::{IdentityDirectory, StaticDirectory};
pub use templates::{FsTemplateSource, InMemoryTemplateSource, TemplateSource};
pub use urls::EditorUrls;
