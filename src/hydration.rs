// SPDX-License-Identifier: MIT

//! Cloud-placeholder hydration
//!
//! On Windows, files under sync roots such as OneDrive may be placeholders:
//! directory entries whose bytes live remotely until something forces a
//! download. Reading one mid-upload can stall or fail, so the uploader first
//! materializes a private local copy. Every other platform gets the no-op
//! implementation and the uploader stays platform-agnostic.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::HydrationConfig;
use crate::Result;

/// A materialized local copy of a placeholder file. The backing temp
/// directory is removed when this value is dropped, success or failure.
#[derive(Debug)]
pub struct HydratedCopy {
    _dir: TempDir,
    path: PathBuf,
}

impl HydratedCopy {
    /// Path to read the file bytes from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Capability interface for placeholder detection and materialization
#[async_trait]
pub trait Hydrator: Send + Sync {
    /// Whether the file at `path` is a cloud placeholder
    fn is_placeholder(&self, path: &Path) -> bool;

    /// Force a local copy of a placeholder. `Ok(None)` means hydration is
    /// not applicable; errors are treated as non-fatal by the caller.
    async fn hydrate(&self, path: &Path) -> Result<Option<HydratedCopy>>;
}

/// Hydrator for platforms without placeholder files
pub struct NoopHydrator;

#[async_trait]
impl Hydrator for NoopHydrator {
    fn is_placeholder(&self, _path: &Path) -> bool {
        false
    }

    async fn hydrate(&self, _path: &Path) -> Result<Option<HydratedCopy>> {
        Ok(None)
    }
}

/// Build the hydrator for the current platform
pub fn platform_hydrator(config: &HydrationConfig) -> Box<dyn Hydrator> {
    #[cfg(windows)]
    {
        Box::new(windows::RobocopyHydrator::new(config))
    }
    #[cfg(not(windows))]
    {
        let _ = config;
        Box::new(NoopHydrator)
    }
}

#[cfg(windows)]
mod windows {
    use super::*;
    use crate::ArchivistError;
    use std::time::Duration;
    use tracing::{debug, warn};

    const FILE_ATTRIBUTE_OFFLINE: u32 = 0x1000;
    const FILE_ATTRIBUTE_RECALL_ON_OPEN: u32 = 0x40000;
    const FILE_ATTRIBUTE_RECALL_ON_DATA_ACCESS: u32 = 0x400000;

    /// Materializes placeholders by copying the single file into a temp
    /// directory with robocopy, which forces the sync engine to download it.
    pub struct RobocopyHydrator {
        timeout: Duration,
    }

    impl RobocopyHydrator {
        pub fn new(config: &HydrationConfig) -> Self {
            Self { timeout: Duration::from_secs(config.timeout_secs) }
        }
    }

    #[async_trait]
    impl Hydrator for RobocopyHydrator {
        fn is_placeholder(&self, path: &Path) -> bool {
            use std::os::windows::fs::MetadataExt;

            let attrs = match std::fs::metadata(path) {
                Ok(meta) => meta.file_attributes(),
                Err(_) => return false,
            };

            attrs & FILE_ATTRIBUTE_OFFLINE != 0
                || attrs & FILE_ATTRIBUTE_RECALL_ON_OPEN != 0
                || attrs & FILE_ATTRIBUTE_RECALL_ON_DATA_ACCESS != 0
        }

        async fn hydrate(&self, path: &Path) -> Result<Option<HydratedCopy>> {
            let src_dir = path
                .parent()
                .ok_or_else(|| ArchivistError::Hydration("file has no parent directory".to_string()))?;
            let file_name = path
                .file_name()
                .ok_or_else(|| ArchivistError::Hydration("file has no name".to_string()))?;

            let dir = tempfile::Builder::new()
                .prefix("onedrive_hydrate_")
                .tempdir()?;

            debug!("Hydrating {:?} into {:?}", path, dir.path());

            // robocopy <source_dir> <dest_dir> <file> copies that single file
            let mut command = tokio::process::Command::new("robocopy");
            command.arg(src_dir).arg(dir.path()).arg(file_name).arg("/J");

            let output = tokio::time::timeout(self.timeout, command.output())
                .await
                .map_err(|_| {
                    ArchivistError::Hydration(format!(
                        "robocopy timed out after {:?} for {:?}",
                        self.timeout, path
                    ))
                })??;

            // robocopy exit codes below 8 are success variants; the real
            // check is whether a non-empty copy landed
            if !output.status.success() {
                debug!("robocopy exit status: {:?}", output.status.code());
            }

            let dest = dir.path().join(file_name);
            let size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
            if size == 0 {
                warn!("robocopy produced no local copy for {:?}", path);
                return Err(ArchivistError::Hydration(format!(
                    "no hydrated copy produced for {:?}",
                    path
                )));
            }

            Ok(Some(HydratedCopy { _dir: dir, path: dest }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_hydrator_never_detects_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "hello").unwrap();

        let hydrator = NoopHydrator;
        assert!(!hydrator.is_placeholder(&file));
        assert!(hydrator.hydrate(&file).await.unwrap().is_none());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_platform_hydrator_is_noop_off_windows() {
        let hydrator = platform_hydrator(&HydrationConfig::default());
        assert!(!hydrator.is_placeholder(Path::new("/tmp/whatever")));
    }
}
