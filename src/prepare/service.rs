//! Request-scoped preparation pipeline
//!
//! provision (optional) -> build -> sign

use std::sync::Arc;
use tracing::{debug, info};

use super::descriptor::{SessionDescriptor, SessionDescriptorBuilder};
use super::provisioner::NewDocumentProvisioner;
use super::token::TokenSigner;
use crate::document::{DocumentRef, LocaleResolver};
use crate::services::{ContentStore, EditorUrls, IdentityDirectory, MessageCatalog, TemplateSource};
use crate::types::{PrepareError, Result};

/// One document-open request
#[derive(Debug, Clone, Default)]
pub struct PrepareRequest {
    /// Document to open, or the container for a new document
    pub node_ref: Option<String>,
    /// MIME type of a new document to create inside `node_ref`
    pub new_mime: Option<String>,
    /// Authenticated user
    pub user_id: String,
    /// Requested UI locale tag (e.g. `de-DE`)
    pub locale: String,
}

/// Collaborators and settings needed to assemble a [`PrepareService`]
pub struct PrepareDeps {
    pub store: Arc<dyn ContentStore>,
    pub directory: Arc<dyn IdentityDirectory>,
    pub catalog: Arc<dyn MessageCatalog>,
    pub templates: Arc<dyn TemplateSource>,
    pub urls: EditorUrls,
    pub locales: LocaleResolver,
    pub signer: Option<TokenSigner>,
    pub max_name_attempts: usize,
}

pub struct PrepareService {
    provisioner: NewDocumentProvisioner,
    builder: SessionDescriptorBuilder,
    signer: Option<TokenSigner>,
    locales: LocaleResolver,
}

impl PrepareService {
    pub fn new(deps: PrepareDeps) -> Self {
        let provisioner = NewDocumentProvisioner::new(
            Arc::clone(&deps.store),
            deps.catalog,
            deps.templates,
            deps.locales.clone(),
        )
        .with_max_name_attempts(deps.max_name_attempts);
        let builder = SessionDescriptorBuilder::new(deps.store, deps.directory, deps.urls);

        Self {
            provisioner,
            builder,
            signer: deps.signer,
            locales: deps.locales,
        }
    }

    pub fn signing_enabled(&self) -> bool {
        self.signer.is_some()
    }

    /// Produce the descriptor for a request. All-or-nothing: any failure
    /// aborts before a descriptor is returned.
    pub async fn prepare(&self, request: PrepareRequest) -> Result<SessionDescriptor> {
        let node_ref = request
            .node_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| PrepareError::InvalidRequest("nodeRef parameter is required".into()))?;
        let mut node = DocumentRef::new(node_ref);

        let language = if request.locale.trim().is_empty() {
            self.locales.default_locale().to_string()
        } else {
            request.locale.trim().to_string()
        };

        if let Some(mime) = request.new_mime.as_deref().filter(|m| !m.trim().is_empty()) {
            debug!("Creating new {} document in {}", mime, node);
            node = self.provisioner.provision(&node, mime.trim(), &language).await?;
        }

        let descriptor = self.builder.build(&node, &request.user_id, &language).await?;

        let descriptor = match &self.signer {
            Some(signer) => signer.sign_into(descriptor)?,
            None => descriptor,
        };

        info!(
            "Prepared {} descriptor for {} (user {}, signed: {})",
            descriptor.document_type,
            node,
            request.user_id,
            descriptor.is_signed()
        );
        Ok(descriptor)
    }
}
