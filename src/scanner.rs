// SPDX-License-Identifier: MIT

//! Directory scanning with an extension allow-list

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ScannerConfig;
use crate::Result;

/// Whether a file's extension is in the allow-list
pub fn is_supported(path: &Path, config: &ScannerConfig) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = ext.to_lowercase();
            config.extensions.iter().any(|allowed| allowed == &ext)
        }
        None => false,
    }
}

/// Recursively enumerate supported files under `root`, pruning conventional
/// tooling directories at any depth. Results follow traversal order; the
/// order is not guaranteed stable across runs or platforms.
pub fn scan_directory(root: &Path, config: &ScannerConfig) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory not found or not a directory: {}", root.display()),
        )
        .into());
    }

    info!("Scanning directory: {}", root.display());

    let mut files = Vec::new();
    walk(root, config, &mut files)?;

    info!("Found {} supported files", files.len());
    Ok(files)
}

fn walk(dir: &Path, config: &ScannerConfig, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if config.excluded_dirs.iter().any(|d| d.as_str() == name) {
                debug!("Skipping excluded directory: {}", path.display());
                continue;
            }
            walk(&path, config, files)?;
        } else if path.is_file() && is_supported(&path, config) {
            debug!("Found: {}", path.display());
            files.push(path);
        }
    }

    Ok(())
}

/// Paths relative to the scanned root, as fed to the organization prompt.
/// Files outside the root keep their full path.
pub fn relative_paths(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|file| {
            file.strip_prefix(root)
                .unwrap_or(file)
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_scan_keeps_allowed_and_prunes_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.py"));
        touch(&root.join("b.txt"));
        touch(&root.join(".git/ignored.py"));

        let config = ScannerConfig::default();
        let mut found = relative_paths(root, &scan_directory(root, &config).unwrap());
        found.sort();

        assert_eq!(found, vec!["a.py".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn test_scan_is_recursive_and_each_file_appears_once() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("top.md"));
        touch(&root.join("sub/deep/notes.txt"));
        touch(&root.join("sub/photo.jpeg"));
        touch(&root.join("node_modules/lib.js"));

        let config = ScannerConfig::default();
        let found = scan_directory(root, &config).unwrap();

        assert_eq!(found.len(), 2);
        let rel = relative_paths(root, &found);
        assert!(rel.contains(&"top.md".to_string()));
        assert!(rel
            .iter()
            .any(|p| p.ends_with("notes.txt") && p.starts_with("sub")));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let config = ScannerConfig::default();
        assert!(is_supported(Path::new("REPORT.PDF"), &config));
        assert!(is_supported(Path::new("a.Py"), &config));
        assert!(!is_supported(Path::new("archive.zip"), &config));
        assert!(!is_supported(Path::new("Makefile"), &config));
    }

    #[test]
    fn test_scan_missing_directory_is_an_error() {
        let config = ScannerConfig::default();
        assert!(scan_directory(Path::new("/nonexistent/archivist"), &config).is_err());
    }
}
