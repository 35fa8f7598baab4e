// SPDX-License-Identifier: MIT

//! Chat requests and defensive response-text extraction
//!
//! The generation endpoint's response schema is not contractually fixed.
//! Extraction runs an ordered list of strategies against the raw JSON and
//! takes the first non-empty match, falling back to serializing the whole
//! response. It never panics and never returns empty for a non-empty
//! response.

use serde_json::Value;
use tracing::debug;

use crate::api::types::{ChatOptions, ChatRequest, Message, ModelRef};
use crate::api::DocumentApi;
use crate::config::ChatConfig;
use crate::Result;

/// System instruction for organization-plan generation
pub const ORGANIZATION_SYSTEM_PROMPT: &str =
    "You are a professional command-line script generator. Only output mkdir and move \
     commands in valid Windows CMD syntax.";

/// Send one synchronous generation request referencing uploaded file ids.
///
/// Callers must only pass ids that have passed the processing barrier; the
/// API does not enforce this itself.
pub async fn request_chat(
    api: &dyn DocumentApi,
    config: &ChatConfig,
    file_ids: &[String],
    message: &str,
    system: Option<&str>,
) -> Result<Value> {
    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(message));

    let request = ChatRequest {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        messages,
        data_sources: file_ids.to_vec(),
        options: ChatOptions {
            rag_only: false,
            skip_rag: false,
            model: ModelRef { id: config.model.clone() },
            prompt: message.to_string(),
            assistant_id: config.assistant_id.clone(),
        },
    };

    api.chat(&request).await
}

type Strategy = fn(&Value) -> Option<String>;

/// Extraction strategies, attempted in order. First non-empty match wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("choice-message-content", choice_message_content),
    ("choice-direct-text", choice_direct_text),
    ("data-string", data_string),
    ("data-known-keys", data_known_keys),
];

/// Extract the generated text from a chat response of uncertain shape
pub fn extract_response_text(response: &Value) -> String {
    if response.is_null() {
        return String::new();
    }

    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(response) {
            if !text.is_empty() {
                debug!("Extracted response text via strategy '{}'", name);
                return text;
            }
        }
    }

    // Last resort: the serialized response itself
    response.to_string()
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// `data.choices[0].message|response.{content|text|body}`
fn choice_message_content(response: &Value) -> Option<String> {
    let first = response.get("data")?.get("choices")?.get(0)?;
    let message = first.get("message").or_else(|| first.get("response"))?;
    let content = message
        .get("content")
        .or_else(|| message.get("text"))
        .or_else(|| message.get("body"))?;
    stringify(content)
}

/// `data.choices[0].{text|content}`
fn choice_direct_text(response: &Value) -> Option<String> {
    let first = response.get("data")?.get("choices")?.get(0)?;
    let text = first.get("text").or_else(|| first.get("content"))?;
    stringify(text)
}

/// Top-level `data` holding the text directly
fn data_string(response: &Value) -> Option<String> {
    response.get("data")?.as_str().map(String::from)
}

/// `data.{output|text|content}` string fallbacks
fn data_known_keys(response: &Value) -> Option<String> {
    let data = response.get("data")?.as_object()?;
    ["output", "text", "content"]
        .iter()
        .find_map(|key| data.get(*key).and_then(Value::as_str))
        .map(String::from)
}

/// Prompt instructing the model to emit move/mkdir commands covering exactly
/// the given relative paths
pub fn organization_prompt(relative_files: &[String]) -> String {
    format!(
        "You are a professional document organizer.\n\
         \n\
         Here are the {count} files currently in the directory:\n\
         {files}\n\
         \n\
         Your task is to generate a valid Windows Command Prompt (.bat) script that \
         organizes *only these files* into a logical folder structure.\n\
         \n\
         Rules:\n\
         - Use `mkdir` to create any needed folders.\n\
         - Use `move` with the exact relative file paths listed above as the source.\n\
         - Use backslashes (`\\`) in all paths.\n\
         - Do not invent filenames that are not listed above.\n\
         - Output only raw commands line by line, no explanations.\n",
        count = relative_files.len(),
        files = relative_files.join("\n"),
    )
}

/// Prompt asking for a summary of a single uploaded document
pub fn summary_prompt(file_name: &str) -> String {
    format!("Please summarize the document: {}", file_name)
}
