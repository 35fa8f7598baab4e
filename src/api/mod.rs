// SPDX-License-Identifier: MIT

//! HTTP client for the Amplify document API

pub mod types;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::{ApiConfig, Credentials};
use crate::{ArchivistError, Result};
use types::{
    ChatRequest, Envelope, FileQuery, FileRecord, FileStatusResponse, QueryResponse,
    UploadRequest, UploadResponse,
};

/// The remote operations the pipelines depend on. `AmplifyClient` is the
/// production implementation; tests substitute their own.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Phase (a) of an upload: register metadata, get back an id and a
    /// pre-signed write URL
    async fn register_upload(&self, request: &UploadRequest) -> Result<UploadResponse>;

    /// Phase (b) of an upload: one direct write of the file bytes to the
    /// pre-signed URL (no further authentication)
    async fn put_object(&self, url: &str, content_type: &str, bytes: Vec<u8>) -> Result<()>;

    /// Processing state of a single uploaded file
    async fn file_status(&self, file_id: &str) -> Result<FileStatusResponse>;

    /// Recently uploaded files matching the query
    async fn query_recent(&self, query: &FileQuery) -> Result<Vec<FileRecord>>;

    /// One synchronous generation request. The response shape is not
    /// contractually fixed, so it is returned raw.
    async fn chat(&self, request: &ChatRequest) -> Result<serde_json::Value>;
}

/// Amplify API client
pub struct AmplifyClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    request_timeout: Duration,
    register_timeout: Duration,
    transfer_timeout: Duration,
}

impl AmplifyClient {
    /// Create a new client from config and a loaded credential
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.transfer_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            register_timeout: Duration::from_secs(config.register_timeout_secs),
            transfer_timeout: Duration::from_secs(config.transfer_timeout_secs),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DocumentApi for AmplifyClient {
    async fn register_upload(&self, request: &UploadRequest) -> Result<UploadResponse> {
        let url = self.endpoint("files/upload");
        debug!("Registering upload: name={} type={}", request.name, request.mime_type);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.credentials.bearer())
            .json(&Envelope::new(request))
            .timeout(self.register_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ArchivistError::Upload(format!(
                "upload registration returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    async fn put_object(&self, url: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        debug!("Transferring {} bytes to pre-signed URL", bytes.len());

        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .timeout(self.transfer_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ArchivistError::Upload(format!(
                "byte transfer returned status {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn file_status(&self, file_id: &str) -> Result<FileStatusResponse> {
        let url = self.endpoint(&format!("files/{}/status", file_id));

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.credentials.bearer())
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ArchivistError::Processing(format!(
                "status lookup for {} returned {}",
                file_id,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    async fn query_recent(&self, query: &FileQuery) -> Result<Vec<FileRecord>> {
        let url = self.endpoint("files/query");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.credentials.bearer())
            .json(&Envelope::new(query))
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ArchivistError::Processing(format!(
                "file query returned status {}",
                response.status()
            )));
        }

        let listing: QueryResponse = response.json().await?;
        Ok(listing.data.items)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<serde_json::Value> {
        let url = self.endpoint("chat");
        debug!(
            "Sending chat request: model={} sources={}",
            request.options.model.id,
            request.data_sources.len()
        );

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.credentials.bearer())
            .json(&Envelope::new(request))
            .timeout(self.transfer_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ArchivistError::Chat(format!(
                "chat returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
