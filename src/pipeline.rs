// SPDX-License-Identifier: MIT

//! End-to-end pipelines
//!
//! `organize` runs scan -> upload -> index-wait -> chat over a directory and
//! persists the returned script verbatim. `summarize` runs the single-file
//! variant and returns the generated summary. Both are sequential and
//! blocking by design; total latency scales with file count times poll wait.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::api::DocumentApi;
use crate::chat::{
    extract_response_text, organization_prompt, request_chat, summary_prompt,
    ORGANIZATION_SYSTEM_PROMPT,
};
use crate::config::AppConfig;
use crate::hydration::platform_hydrator;
use crate::poller::Poller;
use crate::scanner::{relative_paths, scan_directory};
use crate::uploader::Uploader;
use crate::{ArchivistError, Result};

/// Fixed name of the persisted organization script
pub const PLAN_FILE_NAME: &str = "organization_commands.bat";

/// Result of a successful organization-plan run
#[derive(Debug)]
pub struct OrganizeOutcome {
    /// Where the script was written
    pub output_path: PathBuf,
    /// How many files reached the ready state and were fed to the model
    pub file_count: usize,
}

/// Scan a directory, upload its documents, and persist an LLM-generated
/// organization script.
///
/// Per-file upload or indexing failures are logged and skipped; the run
/// fails only when no file makes it through. Chat requests reference only
/// ids that passed the index-wait barrier.
pub async fn organize(
    api: &dyn DocumentApi,
    config: &AppConfig,
    root: &Path,
    output_dir: &Path,
) -> Result<OrganizeOutcome> {
    info!("Source directory: {}", root.display());
    info!("Output directory: {}", output_dir.display());

    let mut files = scan_directory(root, &config.scanner)?;
    if files.is_empty() {
        return Err(ArchivistError::Pipeline("No supported files found".to_string()));
    }

    if let Some(max) = config.scanner.max_files {
        if files.len() > max {
            warn!("Limiting run to the first {} of {} files", max, files.len());
            files.truncate(max);
        }
    }

    let uploader = Uploader::new(api, &config.upload, platform_hydrator(&config.hydration));
    let poller = Poller::new(api, &config.polling);

    let mut ready_ids = Vec::new();
    let mut ready_files = Vec::new();

    for file in &files {
        let uploaded = match uploader.upload(file).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                error!("Skipping {}: {}", file.display(), e);
                continue;
            }
        };

        match poller.wait_for_indexed(&uploaded.name).await {
            Ok(id) => {
                ready_ids.push(id);
                ready_files.push(file.clone());
            }
            Err(e) => {
                error!("Skipping {}: {}", file.display(), e);
            }
        }
    }

    if ready_ids.is_empty() {
        return Err(ArchivistError::Pipeline("No files uploaded".to_string()));
    }

    // Heuristic pause so server-side indexing can settle before the files
    // are referenced; not a consistency guarantee.
    let settle = Duration::from_secs(config.chat.settle_secs);
    if !settle.is_zero() {
        info!("Pausing {:?} for RAG indexing to settle...", settle);
        tokio::time::sleep(settle).await;
    }

    let relative = relative_paths(root, &ready_files);
    let prompt = organization_prompt(&relative);

    info!("Requesting organization plan for {} files...", ready_ids.len());
    let response = request_chat(
        api,
        &config.chat,
        &ready_ids,
        &prompt,
        Some(ORGANIZATION_SYSTEM_PROMPT),
    )
    .await
    .map_err(|e| ArchivistError::Pipeline(format!("Plan generation failed: {}", e)))?;

    let plan = extract_response_text(&response);

    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(PLAN_FILE_NAME);
    std::fs::write(&output_path, &plan)?;

    info!("Organization commands saved to: {}", output_path.display());
    Ok(OrganizeOutcome { output_path, file_count: ready_ids.len() })
}

/// Upload a single document, wait until it is ready, and return an
/// LLM-generated summary of it.
pub async fn summarize(api: &dyn DocumentApi, config: &AppConfig, file: &Path) -> Result<String> {
    info!("Summarizing: {}", file.display());

    let uploader = Uploader::new(api, &config.upload, platform_hydrator(&config.hydration));
    let uploaded = uploader.upload(file).await?;

    let poller = Poller::new(api, &config.polling);
    poller.wait_until_ready(&uploaded.id).await?;

    let response = request_chat(
        api,
        &config.chat,
        &[uploaded.id],
        &summary_prompt(&uploaded.name),
        None,
    )
    .await?;

    Ok(extract_response_text(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{
        ChatRequest, FileQuery, FileRecord, FileStatusResponse, ProcessingState, UploadRequest,
        UploadResponse,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scriptable remote side for pipeline runs
    struct MockApi {
        reject_uploads: bool,
        uploaded: Mutex<Vec<(String, String)>>, // (id, name)
        statuses: Mutex<VecDeque<ProcessingState>>,
        chat_response: serde_json::Value,
        chat_requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockApi {
        fn new(chat_response: serde_json::Value) -> Self {
            Self {
                reject_uploads: false,
                uploaded: Mutex::new(Vec::new()),
                statuses: Mutex::new(VecDeque::new()),
                chat_response,
                chat_requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DocumentApi for MockApi {
        async fn register_upload(&self, request: &UploadRequest) -> Result<UploadResponse> {
            if self.reject_uploads {
                return Ok(UploadResponse {
                    success: false,
                    id: None,
                    upload_url: None,
                    error: Some("rejected".to_string()),
                });
            }
            let mut uploaded = self.uploaded.lock().unwrap();
            let id = format!("id-{}", uploaded.len() + 1);
            uploaded.push((id.clone(), request.name.clone()));
            Ok(UploadResponse {
                success: true,
                id: Some(id),
                upload_url: Some("https://bucket.example/upload".to_string()),
                error: None,
            })
        }

        async fn put_object(&self, _url: &str, _ct: &str, _bytes: Vec<u8>) -> Result<()> {
            Ok(())
        }

        async fn file_status(&self, _file_id: &str) -> Result<FileStatusResponse> {
            let state = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ProcessingState::Ready);
            Ok(FileStatusResponse { status: state })
        }

        async fn query_recent(&self, _query: &FileQuery) -> Result<Vec<FileRecord>> {
            Ok(self
                .uploaded
                .lock()
                .unwrap()
                .iter()
                .map(|(id, name)| FileRecord {
                    id: Some(id.clone()),
                    name: Some(name.clone()),
                })
                .collect())
        }

        async fn chat(&self, request: &ChatRequest) -> Result<serde_json::Value> {
            self.chat_requests.lock().unwrap().push(request.clone());
            Ok(self.chat_response.clone())
        }
    }

    fn fast_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.polling.interval_secs = 0;
        config.chat.settle_secs = 0;
        config
    }

    fn populate(root: &Path) {
        std::fs::write(root.join("a.py"), "print('a')").unwrap();
        std::fs::write(root.join("b.txt"), "b").unwrap();
        std::fs::write(root.join("c.md"), "# c").unwrap();
    }

    #[tokio::test]
    async fn test_organize_writes_plan_verbatim() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        populate(source.path());

        let plan_text = "mkdir sorted\nmove a.py sorted\\a.py";
        let api = MockApi::new(json!({"data": plan_text}));
        let config = fast_config();

        let outcome = organize(&api, &config, source.path(), output.path()).await.unwrap();

        assert_eq!(outcome.file_count, 3);
        assert_eq!(outcome.output_path, output.path().join(PLAN_FILE_NAME));
        let written = std::fs::read_to_string(&outcome.output_path).unwrap();
        assert_eq!(written, plan_text, "plan must be persisted with no modification");
    }

    #[tokio::test]
    async fn test_organize_chat_references_only_ready_ids() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        populate(source.path());

        let api = MockApi::new(json!({"data": "plan"}));
        let config = fast_config();

        organize(&api, &config, source.path(), output.path()).await.unwrap();

        let requests = api.chat_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.data_sources.len(), 3);
        assert!(request.data_sources.iter().all(|id| id.starts_with("id-")));
        assert_eq!(request.messages[0].role, "system");
        let prompt = &request.messages[1].content;
        assert!(prompt.contains("a.py") && prompt.contains("b.txt") && prompt.contains("c.md"));
    }

    #[tokio::test]
    async fn test_organize_respects_max_files_cap() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        populate(source.path());

        let api = MockApi::new(json!({"data": "plan"}));
        let mut config = fast_config();
        config.scanner.max_files = Some(2);

        let outcome = organize(&api, &config, source.path(), output.path()).await.unwrap();
        assert_eq!(outcome.file_count, 2);
    }

    #[tokio::test]
    async fn test_organize_empty_directory_short_circuits() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let api = MockApi::new(json!({"data": "plan"}));
        let config = fast_config();

        let err = organize(&api, &config, source.path(), output.path()).await.unwrap_err();
        assert!(err.to_string().contains("No supported files"));
        assert!(api.chat_requests.lock().unwrap().is_empty());
        assert!(!output.path().join(PLAN_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_organize_fails_when_every_upload_is_rejected() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        populate(source.path());

        let mut api = MockApi::new(json!({"data": "plan"}));
        api.reject_uploads = true;
        let config = fast_config();

        let err = organize(&api, &config, source.path(), output.path()).await.unwrap_err();
        assert!(err.to_string().contains("No files uploaded"));
    }

    #[tokio::test]
    async fn test_summarize_returns_extracted_text() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.txt");
        std::fs::write(&file, "contents").unwrap();

        let api = MockApi::new(json!({
            "data": {"choices": [{"message": {"content": "a fine summary"}}]}
        }));
        api.statuses
            .lock()
            .unwrap()
            .extend([ProcessingState::Pending, ProcessingState::Ready]);
        let config = fast_config();

        let summary = summarize(&api, &config, &file).await.unwrap();
        assert_eq!(summary, "a fine summary");

        let requests = api.chat_requests.lock().unwrap();
        assert_eq!(requests[0].data_sources, vec!["id-1".to_string()]);
        assert!(requests[0].messages[0].content.contains("report.txt"));
    }

    #[tokio::test]
    async fn test_summarize_stops_on_processing_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.txt");
        std::fs::write(&file, "contents").unwrap();

        let api = MockApi::new(json!({"data": "unused"}));
        api.statuses.lock().unwrap().push_back(ProcessingState::Failed);
        let config = fast_config();

        assert!(summarize(&api, &config, &file).await.is_err());
        assert!(api.chat_requests.lock().unwrap().is_empty());
    }
}
