//! Folder watcher feeding discovered photos to the pipeline.
//!
//! Raw `notify` events are filtered by extension and collected in a pending
//! set. A settle task offers pending files to the pipeline on a short tick
//! and keeps the ones that are still being written. A periodic full re-scan
//! catches anything the event stream missed.

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::pipeline::{Admission, Pipeline};
use super::worker::DeliveryWorker;

/// How often pending files are re-offered
const SETTLE_TICK: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Watch folder does not exist: {0}")]
    MissingFolder(PathBuf),

    #[error("Failed to start file watcher: {0}")]
    Notify(#[from] notify::Error),
}

/// Running watcher; dropping it stops every task it started
pub struct FileWatcher {
    folder: PathBuf,
    _watcher: RecommendedWatcher,
    tasks: Vec<JoinHandle<()>>,
}

impl FileWatcher {
    /// Watch `folder` recursively, scanning it once immediately and then
    /// every `rescan` (zero disables re-scans)
    pub fn start(
        folder: &Path,
        pipeline: Arc<Pipeline>,
        worker: Arc<DeliveryWorker>,
        rescan: Duration,
    ) -> Result<Self, WatchError> {
        if !folder.is_dir() {
            return Err(WatchError::MissingFolder(folder.to_path_buf()));
        }

        let (tx, mut rx) = mpsc::channel::<PathBuf>(256);
        let pending: Arc<Mutex<HashSet<PathBuf>>> = Arc::new(Mutex::new(HashSet::new()));
        let mut tasks = Vec::new();

        // Collect raw events into the pending set
        let pending_in = pending.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(path) = rx.recv().await {
                pending_in.lock().await.insert(path);
            }
        }));

        // Offer pending files once they settle
        let pending_settle = pending.clone();
        let settle_pipeline = pipeline.clone();
        let settle_worker = worker.clone();
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::time::sleep(SETTLE_TICK).await;
                let batch: Vec<PathBuf> = pending_settle.lock().await.drain().collect();
                if batch.is_empty() {
                    continue;
                }
                let mut queued = 0usize;
                let mut still_settling = Vec::new();
                for path in batch {
                    match settle_pipeline.offer(&path).await {
                        Admission::Queued => queued += 1,
                        Admission::Settling => still_settling.push(path),
                        other => {
                            tracing::trace!(path = %path.display(), admission = ?other, "Skipped file")
                        }
                    }
                }
                if !still_settling.is_empty() {
                    pending_settle.lock().await.extend(still_settling);
                }
                if queued > 0 {
                    settle_worker.ensure_draining();
                }
            }
        }));

        // Initial scan plus periodic re-scan
        let scan_folder = folder.to_path_buf();
        let scan_pending = pending;
        tasks.push(tokio::spawn(async move {
            loop {
                let found = pipeline.rules().scan(&scan_folder).await;
                tracing::debug!(folder = %scan_folder.display(), files = found.len(), "Scanned folder");
                scan_pending.lock().await.extend(found);
                worker.ensure_draining();
                if rescan.is_zero() {
                    break;
                }
                tokio::time::sleep(rescan).await;
            }
        }));

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if matches!(event.kind, notify::EventKind::Remove(_)) {
                        return;
                    }
                    for path in event.paths {
                        let _ = tx.blocking_send(path);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "File watcher error"),
            },
            Config::default(),
        )?;
        watcher.watch(folder, RecursiveMode::Recursive)?;

        tracing::info!(folder = %folder.display(), "File watcher started");

        Ok(Self {
            folder: folder.to_path_buf(),
            _watcher: watcher,
            tasks,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        tracing::info!(folder = %self.folder.display(), "File watcher stopped");
    }
}
