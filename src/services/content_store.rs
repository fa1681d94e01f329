//! Content store backends
//!
//! The store owns document bytes and the container hierarchy. Two backends
//! ship with the gateway:
//!
//! - [`InMemoryContentStore`]: a `DashMap` keyed by node ref, used in tests
//!   and demo deployments
//! - [`FsContentStore`]: documents are files under a root directory and
//!   containers are directories
//!
//! `create_child` is create-if-absent in both backends. Callers racing on
//! the same name see [`StoreError::AlreadyExists`] rather than overwriting.

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::document::{mime, DocumentProperties, DocumentRef};
use crate::types::StoreError;

/// Trait for the content repository (allows different backends)
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the properties of a node
    async fn properties(&self, node: &DocumentRef) -> Result<DocumentProperties, StoreError>;

    /// Create an empty child under `container`. Fails with
    /// `AlreadyExists` when the name is taken.
    async fn create_child(
        &self,
        container: &DocumentRef,
        name: &str,
        mime_type: &str,
    ) -> Result<DocumentRef, StoreError>;

    /// Replace the content of a node
    async fn write(&self, node: &DocumentRef, content: Bytes) -> Result<(), StoreError>;

    /// Delete a document node. Containers are never removed.
    async fn remove(&self, node: &DocumentRef) -> Result<(), StoreError>;

    /// Read the content of a node
    async fn read(&self, node: &DocumentRef) -> Result<Bytes, StoreError>;

    /// Check whether `container` has a child called `name`
    async fn child_exists(&self, container: &DocumentRef, name: &str) -> Result<bool, StoreError>;

    /// URL the editing server fetches the content from
    async fn content_url(&self, node: &DocumentRef) -> Result<String, StoreError>;

    /// Opaque key that changes whenever the content changes. Derived from
    /// the bytes themselves, never from timestamps alone.
    async fn version_key(&self, node: &DocumentRef) -> Result<String, StoreError>;
}

/// Hex SHA-256 over the given parts, separated by NUL
fn digest_key(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

fn join_ref(container: &DocumentRef, name: &str) -> DocumentRef {
    if container.as_str().is_empty() {
        DocumentRef::new(name)
    } else {
        DocumentRef::new(format!("{}/{}", container.as_str().trim_end_matches('/'), name))
    }
}

fn content_url_for(base_url: &str, node: &DocumentRef) -> String {
    format!(
        "{}/content/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(node.as_str())
    )
}

fn check_child_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StoreError::Io(format!("Invalid child name: {:?}", name)));
    }
    Ok(())
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Clone)]
enum MemNode {
    Container,
    Document {
        properties: DocumentProperties,
        content: Bytes,
        revision: u64,
    },
}

/// Simple in-memory content store
pub struct InMemoryContentStore {
    base_url: String,
    nodes: DashMap<DocumentRef, MemNode>,
}

impl InMemoryContentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            nodes: DashMap::new(),
        }
    }

    /// Register a container node
    pub fn add_container(&self, node: impl Into<DocumentRef>) -> DocumentRef {
        let node = node.into();
        self.nodes.insert(node.clone(), MemNode::Container);
        node
    }

    /// Register a document under `container`, overwriting any existing node
    pub fn add_document(
        &self,
        container: &DocumentRef,
        name: &str,
        mime_type: &str,
        content: impl Into<Bytes>,
    ) -> DocumentRef {
        let node = join_ref(container, name);
        self.nodes.insert(
            node.clone(),
            MemNode::Document {
                properties: DocumentProperties {
                    title: name.to_string(),
                    mime_type: mime_type.to_string(),
                },
                content: content.into(),
                revision: 0,
            },
        );
        node
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn document(&self, node: &DocumentRef) -> Result<(DocumentProperties, Bytes, u64), StoreError> {
        match self.nodes.get(node).map(|n| n.value().clone()) {
            Some(MemNode::Document {
                properties,
                content,
                revision,
            }) => Ok((properties, content, revision)),
            Some(MemNode::Container) => {
                Err(StoreError::Io(format!("{} is a container", node)))
            }
            None => Err(StoreError::NotFound(node.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl ContentStore for InMemoryContentStore {
    async fn properties(&self, node: &DocumentRef) -> Result<DocumentProperties, StoreError> {
        self.document(node).map(|(properties, _, _)| properties)
    }

    async fn create_child(
        &self,
        container: &DocumentRef,
        name: &str,
        mime_type: &str,
    ) -> Result<DocumentRef, StoreError> {
        check_child_name(name)?;
        match self.nodes.get(container).map(|n| n.value().clone()) {
            Some(MemNode::Container) => {}
            Some(_) => return Err(StoreError::Io(format!("{} is not a container", container))),
            None => return Err(StoreError::NotFound(container.to_string())),
        }

        let node = join_ref(container, name);
        match self.nodes.entry(node.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(node.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(MemNode::Document {
                    properties: DocumentProperties {
                        title: name.to_string(),
                        mime_type: mime_type.to_string(),
                    },
                    content: Bytes::new(),
                    revision: 0,
                });
                debug!("Created node {}", node);
                Ok(node)
            }
        }
    }

    async fn write(&self, node: &DocumentRef, content: Bytes) -> Result<(), StoreError> {
        let mut entry = self
            .nodes
            .get_mut(node)
            .ok_or_else(|| StoreError::NotFound(node.to_string()))?;
        match entry.value_mut() {
            MemNode::Document {
                content: current,
                revision,
                ..
            } => {
                *current = content;
                *revision += 1;
                Ok(())
            }
            MemNode::Container => Err(StoreError::Io(format!("{} is a container", node))),
        }
    }

    async fn read(&self, node: &DocumentRef) -> Result<Bytes, StoreError> {
        self.document(node).map(|(_, content, _)| content)
    }

    async fn remove(&self, node: &DocumentRef) -> Result<(), StoreError> {
        self.document(node)?;
        self.nodes
            .remove_if(node, |_, n| matches!(n, MemNode::Document { .. }));
        debug!("Removed node {}", node);
        Ok(())
    }

    async fn child_exists(&self, container: &DocumentRef, name: &str) -> Result<bool, StoreError> {
        if !self.nodes.contains_key(container) {
            return Err(StoreError::NotFound(container.to_string()));
        }
        Ok(self.nodes.contains_key(&join_ref(container, name)))
    }

    async fn content_url(&self, node: &DocumentRef) -> Result<String, StoreError> {
        self.document(node)?;
        Ok(content_url_for(&self.base_url, node))
    }

    async fn version_key(&self, node: &DocumentRef) -> Result<String, StoreError> {
        let (_, content, revision) = self.document(node)?;
        Ok(digest_key(&[
            node.as_str().as_bytes(),
            &revision.to_be_bytes()[..],
            &content[..],
        ]))
    }
}

// ============================================================================
// Filesystem backend
// ============================================================================

/// Content store backed by a directory tree
///
/// Node refs are `/`-separated paths relative to the root. The root itself
/// is the container with the empty ref.
pub struct FsContentStore {
    root: PathBuf,
    base_url: String,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a ref to a path, refusing anything that escapes the root
    fn path_of(&self, node: &DocumentRef) -> Result<PathBuf, StoreError> {
        let relative = Path::new(node.as_str().trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StoreError::NotFound(node.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Resolve a container ref to its directory. Anything that is not a
    /// directory counts as a missing container.
    async fn container_dir(&self, container: &DocumentRef) -> Result<PathBuf, StoreError> {
        let dir = self.path_of(container)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(StoreError::NotFound(container.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(container.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn file_metadata(&self, node: &DocumentRef) -> Result<std::fs::Metadata, StoreError> {
        let path = self.path_of(node)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(meta),
            Ok(_) => Err(StoreError::Io(format!("{} is a container", node))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(node.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl ContentStore for FsContentStore {
    async fn properties(&self, node: &DocumentRef) -> Result<DocumentProperties, StoreError> {
        self.file_metadata(node).await?;
        let title = node
            .as_str()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let mime_type = crate::document::extension_of(&title)
            .and_then(|ext| mime::mime_for(&ext))
            .unwrap_or(mime::OCTET_STREAM)
            .to_string();
        Ok(DocumentProperties { title, mime_type })
    }

    async fn create_child(
        &self,
        container: &DocumentRef,
        name: &str,
        _mime_type: &str,
    ) -> Result<DocumentRef, StoreError> {
        check_child_name(name)?;
        let dir = self.container_dir(container).await?;

        let node = join_ref(container, name);
        let result = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(name))
            .await;

        match result {
            Ok(_) => {
                debug!("Created file node {}", node);
                Ok(node)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(node.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, node: &DocumentRef, content: Bytes) -> Result<(), StoreError> {
        self.file_metadata(node).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.path_of(node)?)
            .await?;
        file.write_all(&content).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read(&self, node: &DocumentRef) -> Result<Bytes, StoreError> {
        self.file_metadata(node).await?;
        let data = tokio::fs::read(self.path_of(node)?).await?;
        Ok(Bytes::from(data))
    }

    async fn child_exists(&self, container: &DocumentRef, name: &str) -> Result<bool, StoreError> {
        check_child_name(name)?;
        let dir = self.container_dir(container).await?;
        match tokio::fs::try_exists(dir.join(name)).await {
            Ok(exists) => Ok(exists),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, node: &DocumentRef) -> Result<(), StoreError> {
        self.file_metadata(node).await?;
        tokio::fs::remove_file(self.path_of(node)?).await?;
        debug!("Removed file node {}", node);
        Ok(())
    }

    async fn content_url(&self, node: &DocumentRef) -> Result<String, StoreError> {
        self.file_metadata(node).await?;
        Ok(content_url_for(&self.base_url, node))
    }

    async fn version_key(&self, node: &DocumentRef) -> Result<String, StoreError> {
        let content = self.read(node).await?;
        Ok(digest_key(&[node.as_str().as_bytes(), &content[..]]))
    }
}
