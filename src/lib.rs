// SPDX-License-Identifier: MIT

//! Archivist: document uploader and AI-assisted organizer
//!
//! Uploads local documents to the Amplify document-intelligence API, waits
//! for server-side processing, and asks the hosted LLM for a summary or a
//! file-organization script.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod hydration;
pub mod pipeline;
pub mod poller;
pub mod scanner;
pub mod uploader;

pub use config::{AppConfig, Credentials};
pub use error::{ArchivistError, Result};
