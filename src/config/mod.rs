// SPDX-License-Identifier: MIT

//! Configuration management for Archivist

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the Amplify API key
pub const API_KEY_VAR: &str = "AMPLIFY_API_KEY";

/// API credential, loaded once at startup and passed explicitly to the
/// client. Never stored in the config file.
#[derive(Debug, Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Load the API key from the environment (with `.env` support).
    /// Missing credential is a fatal configuration error.
    pub fn from_env() -> crate::Result<Self> {
        dotenv::dotenv().ok();
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self { api_key: key }),
            _ => Err(crate::ArchivistError::Config(format!(
                "{} not found in environment. Set it in your shell or a .env file",
                API_KEY_VAR
            ))),
        }
    }

    /// Build directly from a key (tests, embedding)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into() }
    }

    /// Bearer token value for the Authorization header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Remote API endpoints and timeouts
    #[serde(default)]
    pub api: ApiConfig,

    /// Upload metadata defaults
    #[serde(default)]
    pub upload: UploadConfig,

    /// Chat / plan generation settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Polling discipline
    #[serde(default)]
    pub polling: PollConfig,

    /// Directory scanning rules
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Placeholder hydration settings
    #[serde(default)]
    pub hydration: HydrationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for status/query lookups
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for the upload-registration POST
    #[serde(default = "default_register_timeout")]
    pub register_timeout_secs: u64,
    /// Timeout for the pre-signed byte transfer and for chat generation
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: String,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    /// Server-side post-processing actions requested for each file
    #[serde(default = "default_actions")]
    pub actions: Vec<String>,
    /// Index uploads for retrieval-augmented generation
    #[serde(default = "default_true")]
    pub rag_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Pause before the plan request so server-side indexing can settle.
    /// A heuristic, not a consistency guarantee.
    #[serde(default = "default_settle")]
    pub settle_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PollConfig {
    /// Attempts when polling a file id for terminal status
    #[serde(default = "default_status_attempts")]
    pub status_attempts: u32,
    /// Attempts when waiting for a name to appear in the recent-files index
    #[serde(default = "default_index_attempts")]
    pub index_attempts: u32,
    /// Fixed sleep between attempts. No backoff, no jitter: total wait stays
    /// bounded by attempts * interval.
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScannerConfig {
    /// Lowercased extensions (without dot) eligible for upload
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Directory names pruned at any depth
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
    /// Cap on files fed into a single pipeline run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HydrationConfig {
    /// Upper bound on a single robocopy materialization
    #[serde(default = "default_hydrate_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_base_url() -> String { "https://prod-api.vanderbilt.ai".to_string() }
fn default_request_timeout() -> u64 { 30 }
fn default_register_timeout() -> u64 { 50 }
fn default_transfer_timeout() -> u64 { 1000 }
fn default_knowledge_base() -> String { "document_analysis".to_string() }
fn default_tags() -> Vec<String> {
    vec!["document_analysis".to_string(), "organization_plan".to_string()]
}
fn default_actions() -> Vec<String> {
    ["saveAsData", "createChunks", "ingestRag", "makeDownloadable", "extractText"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_true() -> bool { true }
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_temperature() -> f64 { 0.3 }
fn default_max_tokens() -> u32 { 4000 }
fn default_settle() -> u64 { 30 }
fn default_status_attempts() -> u32 { 10 }
fn default_index_attempts() -> u32 { 2 }
fn default_poll_interval() -> u64 { 20 }
fn default_hydrate_timeout() -> u64 { 1000 }

fn default_extensions() -> Vec<String> {
    [
        "py", "js", "ts", "java", "cpp", "c", "cs", "php", "rb", "go",
        "rs", "swift", "kt", "scala", "r", "m", "pl", "sh", "sql", "html",
        "css", "xml", "json", "yaml", "yml", "md", "txt", "pdf", "docx",
        "pptx", "xlsx",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_excluded_dirs() -> Vec<String> {
    [".git", "__pycache__", "node_modules", ".venv", "venv", "env"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            register_timeout_secs: default_register_timeout(),
            transfer_timeout_secs: default_transfer_timeout(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            knowledge_base: default_knowledge_base(),
            tags: default_tags(),
            actions: default_actions(),
            rag_on: true,
            group_id: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            settle_secs: default_settle(),
            assistant_id: None,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            status_attempts: default_status_attempts(),
            index_attempts: default_index_attempts(),
            interval_secs: default_poll_interval(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            excluded_dirs: default_excluded_dirs(),
            max_files: None,
        }
    }
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self { timeout_secs: default_hydrate_timeout() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            upload: UploadConfig::default(),
            chat: ChatConfig::default(),
            polling: PollConfig::default(),
            scanner: ScannerConfig::default(),
            hydration: HydrationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::ArchivistError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
