//! Session descriptor model and builder
//!
//! The descriptor is the JSON configuration the editing frontend hands to
//! the document server. Field names on the wire follow the server's config
//! schema (`type`, `documentType`, `editorConfig.lang`, `token`, ...).

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::document::{classify, extension_of, DocumentRef, DocumentType, UserIdentity};
use crate::services::{ContentStore, EditorUrls, IdentityDirectory};
use crate::types::{PrepareError, Result};

/// Frame size handed to the embedding page
const FULL_FRAME: &str = "100%";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    Edit,
}

/// Complete editor configuration for one document-open request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    #[serde(rename = "type")]
    pub editor_kind: EditorKind,
    pub width: String,
    pub height: String,
    pub document_type: DocumentType,
    pub document: DocumentInfo,
    pub editor_config: EditorConfig,
    /// Base URL of the editing server, used by the frontend to load its API
    #[serde(rename = "onlyofficeUrl")]
    pub editor_service_url: String,
    /// Signed token over every other field
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl SessionDescriptor {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub title: String,
    pub url: String,
    pub file_type: String,
    /// Version key; changes whenever the content changes
    pub key: String,
    pub permissions: Permissions,
}

impl DocumentInfo {
    pub fn editable(&self) -> bool {
        self.permissions.edit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub edit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(rename = "lang")]
    pub language: String,
    pub mode: EditorMode,
    pub callback_url: String,
    pub user: EditorUser,
    pub customization: Customization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorUser {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
}

impl EditorUser {
    /// Build from a directory entry, or from the bare id when the
    /// directory does not know the user
    pub fn from_identity(user_id: &str, identity: Option<UserIdentity>) -> Self {
        match identity {
            Some(identity) => Self {
                id: user_id.to_string(),
                name: identity.display_name(),
                firstname: identity.first_name,
                lastname: identity.last_name,
            },
            None => Self {
                id: user_id.to_string(),
                name: user_id.to_string(),
                firstname: None,
                lastname: None,
            },
        }
    }
}

/// Editor UI flags. Deployment policy, not negotiable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    pub forcesave: bool,
    pub chat: bool,
    pub comments: bool,
    #[serde(rename = "hideRightMenu")]
    pub hide_right_menu: bool,
}

impl Customization {
    /// Force-save on, chat and comments off, simplified menu
    pub const DEPLOYMENT: Self = Self {
        forcesave: true,
        chat: false,
        comments: false,
        hide_right_menu: true,
    };
}

impl Default for Customization {
    fn default() -> Self {
        Self::DEPLOYMENT
    }
}

/// Assembles unsigned descriptors from store and directory data
pub struct SessionDescriptorBuilder {
    store: Arc<dyn ContentStore>,
    directory: Arc<dyn IdentityDirectory>,
    urls: EditorUrls,
    customization: Customization,
}

impl SessionDescriptorBuilder {
    pub fn new(
        store: Arc<dyn ContentStore>,
        directory: Arc<dyn IdentityDirectory>,
        urls: EditorUrls,
    ) -> Self {
        Self {
            store,
            directory,
            urls,
            customization: Customization::DEPLOYMENT,
        }
    }

    pub fn urls(&self) -> &EditorUrls {
        &self.urls
    }

    /// Build the descriptor for `node` as seen by `user_id`.
    ///
    /// Fails when the node cannot be read or its title does not carry a
    /// known office extension. Nothing is emitted on failure.
    pub async fn build(
        &self,
        node: &DocumentRef,
        user_id: &str,
        language: &str,
    ) -> Result<SessionDescriptor> {
        let properties = self.store.properties(node).await?;
        if properties.title.trim().is_empty() {
            return Err(PrepareError::UnclassifiedDocumentType(String::new()));
        }

        let file_type = extension_of(&properties.title)
            .ok_or_else(|| PrepareError::UnclassifiedDocumentType(properties.title.clone()))?;
        let document_type =
            classify(&file_type).map_err(|u| PrepareError::UnclassifiedDocumentType(u.0))?;

        let url = self.store.content_url(node).await?;
        let key = self.store.version_key(node).await?;
        let callback_url = self.urls.callback_url(node);

        let identity = self.directory.lookup(user_id).await;
        if identity.is_none() {
            debug!("User {} not in directory, using id as display name", user_id);
        }
        let user = EditorUser::from_identity(user_id, identity);

        Ok(SessionDescriptor {
            editor_kind: EditorKind::Desktop,
            width: FULL_FRAME.to_string(),
            height: FULL_FRAME.to_string(),
            document_type,
            document: DocumentInfo {
                title: properties.title,
                url,
                file_type,
                key,
                permissions: Permissions { edit: true },
            },
            editor_config: EditorConfig {
                language: language.to_string(),
                mode: EditorMode::Edit,
                callback_url,
                user,
                customization: self.customization,
            },
            editor_service_url: self.urls.editor_service_url.clone(),
            signature: None,
        })
    }
}
