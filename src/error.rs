// SPDX-License-Identifier: MIT

//! Error types for Archivist

use thiserror::Error;

/// Result type alias for Archivist operations
pub type Result<T> = std::result::Result<T, ArchivistError>;

/// Archivist error types
#[derive(Error, Debug)]
pub enum ArchivistError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Chat request failed: {0}")]
    Chat(String),

    #[error("Hydration failed: {0}")]
    Hydration(String),

    #[error("Pipeline failed: {0}")]
    Pipeline(String),
}
