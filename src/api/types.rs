// SPDX-License-Identifier: MIT

//! Wire types for the Amplify document API
//!
//! Field names follow the remote API's JSON contract (camelCase on the
//! wire). The contract is loose: responses are tolerated with missing or
//! extra fields, and chat responses are kept as raw `serde_json::Value`.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// Request/query bodies are wrapped in a `{ "data": ... }` envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Metadata registered for a single file upload. Immutable once sent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
    pub knowledge_base: String,
    pub tags: Vec<String>,
    /// Reserved by the API; always an empty object
    pub data: serde_json::Value,
    pub actions: Vec<UploadAction>,
    pub rag_on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// A named server-side post-processing action
#[derive(Debug, Clone, Serialize)]
pub struct UploadAction {
    pub name: String,
}

/// Server response to an upload registration. The id is the join key for
/// later polling and chat.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "uploadUrl")]
    pub upload_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Processing state reported by the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Pending,
    Ready,
    Failed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessingState::Pending => "pending",
            ProcessingState::Ready => "ready",
            ProcessingState::Failed => "failed",
            ProcessingState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileStatusResponse {
    pub status: ProcessingState,
}

/// Query over recently uploaded files
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQuery {
    pub start_date: String,
    pub page_size: u32,
    pub page_index: u32,
    pub forward_scan: bool,
    pub sort_index: String,
    pub types: Vec<String>,
    pub tags: Vec<String>,
}

impl FileQuery {
    /// Files uploaded since yesterday midnight UTC, in creation order
    pub fn recent() -> Self {
        let start = Utc::now() - Duration::days(1);
        Self {
            start_date: format!("{}T00:00:00Z", start.format("%Y-%m-%d")),
            page_size: 100,
            page_index: 0,
            forward_scan: true,
            sort_index: "createdAt".to_string(),
            types: queryable_mime_types(),
            tags: Vec::new(),
        }
    }
}

/// MIME types the recent-files query asks for
fn queryable_mime_types() -> Vec<String> {
    [
        "text/plain",
        "text/x-python",
        "application/json",
        "text/xml",
        "text/html",
        "application/pdf",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub data: QueryData,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryData {
    #[serde(default)]
    pub items: Vec<FileRecord>,
}

/// One entry from the recent-files listing
#[derive(Debug, Clone, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One chat message
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// A single synchronous generation request referencing uploaded files
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub temperature: f64,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    #[serde(rename = "dataSources")]
    pub data_sources: Vec<String>,
    pub options: ChatOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOptions {
    pub rag_only: bool,
    pub skip_rag: bool,
    pub model: ModelRef,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelRef {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_wire_shape() {
        let request = UploadRequest {
            mime_type: "text/plain".to_string(),
            name: "notes.txt".to_string(),
            knowledge_base: "documentation".to_string(),
            tags: vec!["docs".to_string()],
            data: serde_json::json!({}),
            actions: vec![UploadAction { name: "extractText".to_string() }],
            rag_on: true,
            group_id: None,
        };

        let value = serde_json::to_value(Envelope::new(&request)).unwrap();
        let data = &value["data"];
        assert_eq!(data["type"], "text/plain");
        assert_eq!(data["knowledgeBase"], "documentation");
        assert_eq!(data["ragOn"], true);
        assert_eq!(data["actions"][0]["name"], "extractText");
        // optional group id must be absent, not null
        assert!(data.get("groupId").is_none());
    }

    #[test]
    fn test_upload_response_tolerates_missing_fields() {
        let response: UploadResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(response.success);
        assert!(response.id.is_none());
        assert!(response.upload_url.is_none());

        let response: UploadResponse =
            serde_json::from_str(r#"{"success": true, "id": "f1", "uploadUrl": "https://s3/x"}"#)
                .unwrap();
        assert_eq!(response.id.as_deref(), Some("f1"));
        assert_eq!(response.upload_url.as_deref(), Some("https://s3/x"));
    }

    #[test]
    fn test_processing_state_parsing() {
        let status: FileStatusResponse = serde_json::from_str(r#"{"status": "ready"}"#).unwrap();
        assert_eq!(status.status, ProcessingState::Ready);

        let status: FileStatusResponse = serde_json::from_str(r#"{"status": "failed"}"#).unwrap();
        assert_eq!(status.status, ProcessingState::Failed);

        // unrecognized states must not be treated as ready
        let status: FileStatusResponse =
            serde_json::from_str(r#"{"status": "queued"}"#).unwrap();
        assert_eq!(status.status, ProcessingState::Unknown);
    }

    #[test]
    fn test_file_query_wire_shape() {
        let query = FileQuery::recent();
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["pageSize"], 100);
        assert_eq!(value["forwardScan"], true);
        assert_eq!(value["sortIndex"], "createdAt");
        assert!(value["startDate"].as_str().unwrap().ends_with("T00:00:00Z"));
    }

    #[test]
    fn test_query_response_parsing() {
        let response: QueryResponse = serde_json::from_str(
            r#"{"data": {"items": [{"id": "f1", "name": "a.py"}, {"name": "b.txt"}]}}"#,
        )
        .unwrap();
        assert_eq!(response.data.items.len(), 2);
        assert_eq!(response.data.items[0].id.as_deref(), Some("f1"));
        assert!(response.data.items[1].id.is_none());

        // empty body still parses
        let response: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(response.data.items.is_empty());
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let request = ChatRequest {
            temperature: 0.3,
            max_tokens: 4000,
            messages: vec![Message::system("be terse"), Message::user("summarize")],
            data_sources: vec!["f1".to_string()],
            options: ChatOptions {
                rag_only: false,
                skip_rag: false,
                model: ModelRef { id: "gpt-4o-mini".to_string() },
                prompt: "summarize".to_string(),
                assistant_id: None,
            },
        };

        let value = serde_json::to_value(Envelope::new(&request)).unwrap();
        let data = &value["data"];
        assert_eq!(data["max_tokens"], 4000);
        assert_eq!(data["dataSources"][0], "f1");
        assert_eq!(data["options"]["ragOnly"], false);
        assert_eq!(data["options"]["model"]["id"], "gpt-4o-mini");
        assert_eq!(data["messages"][0]["role"], "system");
        assert!(data["options"].get("assistantId").is_none());
    }
}
