//! New document provisioning
//!
//! Creates a blank document of the requested type inside a container,
//! named after the localized "New document" string and seeded from a
//! template.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::document::naming::{self, DEFAULT_MAX_ATTEMPTS};
use crate::document::{mime, DocumentRef, LocaleResolver};
use crate::services::{new_document_key, ContentStore, MessageCatalog, TemplateSource};
use crate::types::{PrepareError, Result, StoreError};

pub struct NewDocumentProvisioner {
    store: Arc<dyn ContentStore>,
    catalog: Arc<dyn MessageCatalog>,
    templates: Arc<dyn TemplateSource>,
    locales: LocaleResolver,
    max_name_attempts: usize,
}

impl NewDocumentProvisioner {
    pub fn new(
        store: Arc<dyn ContentStore>,
        catalog: Arc<dyn MessageCatalog>,
        templates: Arc<dyn TemplateSource>,
        locales: LocaleResolver,
    ) -> Self {
        Self {
            store,
            catalog,
            templates,
            locales,
            max_name_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_name_attempts(mut self, attempts: usize) -> Self {
        self.max_name_attempts = attempts.max(1);
        self
    }

    /// Create a new document of `desired_mime` under `container`.
    ///
    /// The template is loaded before anything is written, so a failure
    /// leaves the container untouched. Exactly one node is created.
    pub async fn provision(
        &self,
        container: &DocumentRef,
        desired_mime: &str,
        locale_tag: &str,
    ) -> Result<DocumentRef> {
        let extension = mime::extension_for(desired_mime).ok_or_else(|| {
            PrepareError::InvalidRequest(format!("Unsupported MIME type: {}", desired_mime))
        })?;

        let locale = self.locales.resolve(locale_tag);
        let key = new_document_key(extension);
        let base_name = self
            .catalog
            .message(&key, &locale)
            .await
            .ok_or(PrepareError::MissingMessage(key))?;

        let template = self
            .templates
            .empty_document_template(extension, &locale)
            .await
            .ok_or_else(|| PrepareError::TemplateUnavailable(extension.to_string()))?;

        // Store the table's spelling, not the caller's raw parameter
        let mime_type = mime::mime_for(extension).unwrap_or(mime::OCTET_STREAM);
        let node = self
            .create_unique(container, &base_name, extension, mime_type)
            .await?;
        if let Err(e) = self.store.write(&node, template).await {
            if let Err(cleanup) = self.store.remove(&node).await {
                warn!("Could not remove unwritten node {}: {}", node, cleanup);
            }
            return Err(e.into());
        }

        info!(
            "Provisioned {} in {} (locale {})",
            node, container, locale
        );
        Ok(node)
    }

    /// Walk the candidate names until the store accepts one.
    ///
    /// `create_child` is create-if-absent, so a concurrent request that
    /// takes a name between the existence check and the create just pushes
    /// us on to the next candidate.
    async fn create_unique(
        &self,
        container: &DocumentRef,
        base_name: &str,
        extension: &str,
        mime_type: &str,
    ) -> Result<DocumentRef> {
        for name in naming::candidates(base_name, extension, self.max_name_attempts) {
            if self.store.child_exists(container, &name).await? {
                continue;
            }

            match self.store.create_child(container, &name, mime_type).await {
                Ok(node) => {
                    debug!("Allocated name {:?}", name);
                    return Ok(node);
                }
                Err(StoreError::AlreadyExists(_)) => {
                    warn!("Name {:?} taken concurrently, trying next", name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(naming::exhausted(base_name, self.max_name_attempts))
    }
}
