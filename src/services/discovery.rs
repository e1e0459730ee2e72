//! Decide which files in the watched folder are photos ready to send.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

use crate::models::DiscoveryConfig;

/// Result of checking a file against the quiescence window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Unchanged for at least the quiescence window
    Settled,
    /// Still being written (or just modified)
    Settling,
    /// Gone, or not a regular file
    Missing,
}

/// Extension filter plus quiescence window
#[derive(Debug, Clone)]
pub struct DiscoveryRules {
    extensions: Vec<String>,
    quiescence: Duration,
}

impl DiscoveryRules {
    pub fn new(extensions: Vec<String>, quiescence: Duration) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self {
            extensions,
            quiescence,
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(
            config.extensions.clone(),
            Duration::from_millis(config.quiescence_ms),
        )
    }

    pub fn quiescence(&self) -> Duration {
        self.quiescence
    }

    /// Case-insensitive extension check
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.extensions.iter().any(|x| *x == e)
            })
            .unwrap_or(false)
    }

    /// Check whether the file has stopped changing
    pub async fn readiness(&self, path: &Path) -> Readiness {
        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => meta,
            _ => return Readiness::Missing,
        };
        if self.quiescence.is_zero() {
            return Readiness::Settled;
        }
        let age = meta
            .modified()
            .ok()
            .and_then(|m| SystemTime::now().duration_since(m).ok())
            .unwrap_or(Duration::ZERO);
        if age >= self.quiescence {
            Readiness::Settled
        } else {
            Readiness::Settling
        }
    }

    /// Recursively list supported files under `root`, sorted by path
    pub async fn scan(&self, root: &Path) -> Vec<PathBuf> {
        let rules = self.clone();
        let root = root.to_path_buf();
        let result = tokio::task::spawn_blocking(move || {
            let mut found: Vec<PathBuf> = WalkDir::new(&root)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::debug!(error = %e, "Skipping unreadable entry during scan");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| rules.is_supported(path))
                .collect();
            found.sort();
            found
        })
        .await;

        match result {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "Folder scan task failed");
                Vec::new()
            }
        }
    }
}
