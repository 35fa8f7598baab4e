// SPDX-License-Identifier: MIT

//! Bounded fixed-interval waiting for server-side processing
//!
//! One status query per attempt with a fixed sleep in between. No backoff,
//! no jitter: the total blocking time is bounded by attempts * interval
//! plus query latency.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::types::{FileQuery, ProcessingState};
use crate::api::DocumentApi;
use crate::config::PollConfig;
use crate::{ArchivistError, Result};

/// Waits for uploaded files to finish processing
pub struct Poller<'a> {
    api: &'a dyn DocumentApi,
    config: &'a PollConfig,
}

impl<'a> Poller<'a> {
    pub fn new(api: &'a dyn DocumentApi, config: &'a PollConfig) -> Self {
        Self { api, config }
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval_secs)
    }

    /// Block until the file's status endpoint reports `ready`.
    ///
    /// Succeeds only on an explicit `ready`. A `failed` report ends the wait
    /// immediately; anything else (pending, unknown states, transport errors
    /// on a single attempt) consumes the attempt and the wait continues
    /// until the budget runs out.
    pub async fn wait_until_ready(&self, file_id: &str) -> Result<()> {
        let attempts = self.config.status_attempts;
        info!("Waiting for file {} to be processed...", file_id);

        for attempt in 1..=attempts {
            match self.api.file_status(file_id).await {
                Ok(status) => {
                    debug!("Attempt {}/{} - file status: {}", attempt, attempts, status.status);
                    match status.status {
                        ProcessingState::Ready => {
                            info!("File {} is ready", file_id);
                            return Ok(());
                        }
                        ProcessingState::Failed => {
                            return Err(ArchivistError::Processing(format!(
                                "File {} processing failed",
                                file_id
                            )));
                        }
                        ProcessingState::Pending | ProcessingState::Unknown => {}
                    }
                }
                Err(e) => {
                    warn!("Attempt {}/{} - error checking status: {}", attempt, attempts, e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.interval()).await;
            }
        }

        Err(ArchivistError::Processing(format!(
            "File {} did not become ready within {} attempts",
            file_id, attempts
        )))
    }

    /// Block until a file with the given name shows up in the recent-files
    /// index, returning its server-assigned id.
    pub async fn wait_for_indexed(&self, file_name: &str) -> Result<String> {
        let attempts = self.config.index_attempts;
        info!("Waiting for '{}' to appear in the file index...", file_name);

        for attempt in 1..=attempts {
            match self.api.query_recent(&FileQuery::recent()).await {
                Ok(records) => {
                    let found = records.iter().find(|record| {
                        record.name.as_deref() == Some(file_name) && record.id.is_some()
                    });
                    if let Some(record) = found {
                        let id = record.id.clone().unwrap_or_default();
                        info!("File '{}' is available (id: {})", file_name, id);
                        return Ok(id);
                    }
                    debug!("Attempt {}/{} - '{}' not indexed yet", attempt, attempts, file_name);
                }
                Err(e) => {
                    warn!("Attempt {}/{} - could not query files: {}", attempt, attempts, e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.interval()).await;
            }
        }

        Err(ArchivistError::Processing(format!(
            "File '{}' did not become available within {} attempts",
            file_name, attempts
        )))
    }
}
