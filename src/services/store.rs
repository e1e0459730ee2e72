//! JSON snapshot of the relay state on disk.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::pipeline::Pipeline;
use super::transforms::TransformSlot;
use crate::models::PersistedState;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("State file IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and writes the state document
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document; `None` when no state has been saved yet
    pub async fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the document through a temp file and rename it into place
    pub async fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(state)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Assemble the current document from live state
    pub async fn capture(pipeline: &Pipeline, transforms: &TransformSlot) -> PersistedState {
        let mut state = pipeline.export().await;
        state.active_transform_selector = transforms.selector().await;
        state.saved_at = Some(Utc::now());
        state
    }

    /// Save the live state; failures are logged and otherwise ignored
    pub async fn persist(&self, pipeline: &Pipeline, transforms: &TransformSlot) {
        let state = Self::capture(pipeline, transforms).await;
        match self.save(&state).await {
            Ok(()) => tracing::debug!(
                path = %self.path.display(),
                queue_size = state.queue.len(),
                "Saved state"
            ),
            Err(e) => tracing::error!(
                error = %e,
                path = %self.path.display(),
                "Failed to save state"
            ),
        }
    }

    /// Save on a fixed interval until the task is aborted
    pub fn spawn_snapshots(
        self: Arc<Self>,
        pipeline: Arc<Pipeline>,
        transforms: Arc<TransformSlot>,
        every: Duration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.persist(&pipeline, &transforms).await;
            }
        })
    }
}
