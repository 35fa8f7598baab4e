// SPDX-License-Identifier: MIT

//! Two-phase file upload
//!
//! Phase (a) registers upload metadata and yields a server-assigned id plus
//! a pre-signed write URL; phase (b) transfers the raw bytes to that URL.
//! The operation is all-or-nothing from the caller's perspective: a phase
//! (b) failure is an error naming the already-registered id, never a
//! success.

use std::path::Path;
use tracing::{info, warn};

use crate::api::types::{UploadAction, UploadRequest};
use crate::api::DocumentApi;
use crate::config::UploadConfig;
use crate::hydration::Hydrator;
use crate::{ArchivistError, Result};

/// Fallback when the MIME type cannot be inferred from the extension
const DEFAULT_MIME: &str = "text/plain";

/// A successfully uploaded file
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Server-assigned id, the join key for polling and chat
    pub id: String,
    /// Basename the file was registered under
    pub name: String,
}

/// Uploads local files through the two-phase protocol
pub struct Uploader<'a> {
    api: &'a dyn DocumentApi,
    config: &'a UploadConfig,
    hydrator: Box<dyn Hydrator>,
}

impl<'a> Uploader<'a> {
    pub fn new(
        api: &'a dyn DocumentApi,
        config: &'a UploadConfig,
        hydrator: Box<dyn Hydrator>,
    ) -> Self {
        Self { api, config, hydrator }
    }

    /// Infer the MIME type sent as upload metadata and as the Content-Type
    /// of the byte transfer
    pub fn mime_type(path: &Path) -> &'static str {
        mime_guess::from_path(path).first_raw().unwrap_or(DEFAULT_MIME)
    }

    /// Upload one file. Returns the server-assigned id on success.
    pub async fn upload(&self, path: &Path) -> Result<UploadedFile> {
        if !path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
            .into());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ArchivistError::Upload(format!("No file name: {}", path.display())))?;
        let mime_type = Self::mime_type(path);

        // Materialize a local copy if the file is a cloud placeholder.
        // Hydration failure is non-fatal: fall back to the original path.
        // The guard stays in scope so the temp copy outlives the transfer
        // and is deleted afterwards regardless of outcome.
        let hydrated = if self.hydrator.is_placeholder(path) {
            info!("Detected cloud placeholder, hydrating: {}", path.display());
            match self.hydrator.hydrate(path).await {
                Ok(copy) => copy,
                Err(e) => {
                    warn!("Hydration failed ({}), reading original path directly", e);
                    None
                }
            }
        } else {
            None
        };
        let read_path = hydrated.as_ref().map(|c| c.path()).unwrap_or(path);

        let request = UploadRequest {
            mime_type: mime_type.to_string(),
            name: name.clone(),
            knowledge_base: self.config.knowledge_base.clone(),
            tags: self.config.tags.clone(),
            data: serde_json::json!({}),
            actions: self
                .config
                .actions
                .iter()
                .map(|a| UploadAction { name: a.clone() })
                .collect(),
            rag_on: self.config.rag_on,
            group_id: self.config.group_id.clone(),
        };

        let response = self.api.register_upload(&request).await?;

        if !response.success {
            return Err(ArchivistError::Upload(format!(
                "{}: {}",
                name,
                response.error.as_deref().unwrap_or("Unknown error")
            )));
        }

        let id = response
            .id
            .ok_or_else(|| ArchivistError::Upload(format!("{}: no file id in response", name)))?;
        let upload_url = response.upload_url.ok_or_else(|| {
            ArchivistError::Upload(format!("{}: no upload URL received from server", name))
        })?;

        let bytes = tokio::fs::read(read_path).await?;

        // No compensating delete exists on the API side, so a failed
        // transfer leaves a registered-but-empty file behind. Surface the
        // id so the condition is diagnosable.
        if let Err(e) = self.api.put_object(&upload_url, mime_type, bytes).await {
            warn!("File {} registered but left without content", id);
            return Err(ArchivistError::Upload(format!(
                "{}: registered as {} but byte transfer failed: {}",
                name, id, e
            )));
        }

        info!("Uploaded: {} (id: {})", name, id);
        Ok(UploadedFile { id, name })
    }
}
