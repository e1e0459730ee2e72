//! Application state owner wiring the pipeline, worker, watcher and store.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::discovery::DiscoveryRules;
use super::file_watcher::{FileWatcher, WatchError};
use super::pipeline::{Pipeline, Stats};
use super::store::StateStore;
use super::transforms::{TransformInfo, TransformSlot};
use super::uploader::{Destination, Uploader};
use super::worker::{DeliveryWorker, RetryPolicy};
use crate::models::AppConfig;
use crate::presets::{PresetCatalog, PresetEntry, PresetError};

/// Settings supplied when monitoring starts; unset fields fall back to the
/// configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRequest {
    #[serde(default)]
    pub watch_folder: Option<PathBuf>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Watch folder is required")]
    MissingFolder,

    #[error("API URL is required")]
    MissingUrl,

    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// One queued file as shown by the control API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedFile {
    pub path: PathBuf,
    pub enqueued_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub queue_size: usize,
    pub is_processing: bool,
    pub is_monitoring: bool,
    pub current_session: Option<String>,
    pub entries: Vec<QueuedFile>,
}

pub struct Relay {
    config: AppConfig,
    pipeline: Arc<Pipeline>,
    transforms: Arc<TransformSlot>,
    store: Arc<StateStore>,
    worker: Arc<DeliveryWorker>,
    catalog: PresetCatalog,
    watcher: Mutex<Option<FileWatcher>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Relay {
    pub fn new(config: AppConfig, uploader: Arc<dyn Uploader>) -> Self {
        let pipeline = Arc::new(Pipeline::new(DiscoveryRules::from_config(
            &config.discovery,
        )));
        let transforms = Arc::new(TransformSlot::new());
        let store = Arc::new(StateStore::new(config.state_file.clone()));
        let worker = Arc::new(DeliveryWorker::new(
            pipeline.clone(),
            transforms.clone(),
            store.clone(),
            uploader,
            RetryPolicy::from_config(&config.delivery),
            config.jpeg_quality,
        ));

        let catalog = match &config.presets_file {
            Some(path) => PresetCatalog::load(path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load preset catalog, no presets available");
                PresetCatalog::default()
            }),
            None => PresetCatalog::default(),
        };

        Self {
            config,
            pipeline,
            transforms,
            store,
            worker,
            catalog,
            watcher: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn worker(&self) -> &Arc<DeliveryWorker> {
        &self.worker
    }

    /// Load the saved state, if any. A corrupt file is logged and ignored.
    pub async fn restore_from_store(&self) {
        match self.store.load().await {
            Ok(Some(state)) => {
                self.pipeline.restore(&state).await;
                self.transforms
                    .restore(&state.active_transform_selector)
                    .await;
                tracing::info!(
                    path = %self.store.path().display(),
                    queue_size = state.queue.len(),
                    delivered = state.ledger_entries.len(),
                    transform = state.active_transform_selector.kind(),
                    "Restored saved state"
                );
            }
            Ok(None) => tracing::debug!("No saved state found"),
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.store.path().display(),
                "Could not read saved state, starting fresh"
            ),
        }
    }

    /// Start the worker loop and the periodic snapshot task
    pub async fn spawn_background(&self) {
        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            return;
        }
        tasks.push(self.worker.clone().spawn());
        if self.config.persistence.snapshot_secs > 0 {
            tasks.push(self.store.clone().spawn_snapshots(
                self.pipeline.clone(),
                self.transforms.clone(),
                Duration::from_secs(self.config.persistence.snapshot_secs),
            ));
        }
    }

    /// Start watching a folder and delivering to an endpoint.
    ///
    /// A running watcher is replaced. The queue left from earlier runs is
    /// drained right away.
    pub async fn start_monitoring(&self, request: MonitorRequest) -> Result<Stats, MonitorError> {
        let folder = request
            .watch_folder
            .or_else(|| self.config.watch_folder.clone())
            .ok_or(MonitorError::MissingFolder)?;
        let url = request
            .api_url
            .or_else(|| self.config.api_url.clone())
            .filter(|u| !u.trim().is_empty())
            .ok_or(MonitorError::MissingUrl)?;
        let token = request.api_token.or_else(|| self.config.api_token.clone());

        let mut watcher = self.watcher.lock().await;
        // Stop the old watcher before the new one emits anything
        watcher.take();

        self.worker
            .set_destination(Some(Destination {
                url: url.clone(),
                token,
            }))
            .await;
        let started = FileWatcher::start(
            &folder,
            self.pipeline.clone(),
            self.worker.clone(),
            Duration::from_secs(self.config.discovery.rescan_secs),
        );
        let started = match started {
            Ok(started) => started,
            Err(e) => {
                self.worker.set_enabled(false);
                return Err(e.into());
            }
        };
        *watcher = Some(started);
        drop(watcher);

        self.worker.set_enabled(true);
        tracing::info!(folder = %folder.display(), api_url = %url, "Monitoring started");

        self.persist().await;
        self.worker.ensure_draining();
        Ok(self.pipeline.stats().await)
    }

    /// Stop discovery and delivery. The in-flight entry finishes; the queue
    /// is kept and the session binding is cleared.
    pub async fn stop_monitoring(&self) {
        self.watcher.lock().await.take();
        self.worker.set_enabled(false);
        self.pipeline.clear_session().await;
        self.persist().await;
        tracing::info!("Monitoring stopped");
    }

    pub async fn is_monitoring(&self) -> bool {
        self.watcher.lock().await.is_some()
    }

    /// Zero counters and forget delivered files and the session
    pub async fn reset_history(&self) -> Stats {
        let stats = self.pipeline.reset_history().await;
        self.persist().await;
        tracing::info!("Upload history reset");
        stats
    }

    pub async fn stats(&self) -> Stats {
        self.pipeline.stats().await
    }

    pub async fn queue_status(&self) -> QueueStatus {
        let entries = self
            .pipeline
            .queued_entries()
            .await
            .into_iter()
            .map(|e| QueuedFile {
                path: e.path,
                enqueued_at: e.enqueued_at,
            })
            .collect::<Vec<_>>();
        QueueStatus {
            queue_size: entries.len(),
            is_processing: self.worker.is_draining(),
            is_monitoring: self.is_monitoring().await,
            current_session: self.pipeline.session().await,
            entries,
        }
    }

    pub fn presets(&self) -> &[PresetEntry] {
        self.catalog.entries()
    }

    pub async fn transform_info(&self) -> TransformInfo {
        self.transforms.info().await
    }

    pub async fn activate_preset(&self, id: &str) -> Result<TransformInfo, PresetError> {
        let info = self.transforms.activate_preset(&self.catalog, id).await?;
        self.persist().await;
        Ok(info)
    }

    pub async fn activate_table(&self, path: &Path) -> Result<TransformInfo, PresetError> {
        let info = self.transforms.activate_table(path, None).await?;
        self.persist().await;
        Ok(info)
    }

    pub async fn activate_adjustment(&self, path: &Path) -> Result<TransformInfo, PresetError> {
        let info = self.transforms.activate_adjustment(path, None).await?;
        self.persist().await;
        Ok(info)
    }

    pub async fn remove_transform(&self) -> TransformInfo {
        let info = self.transforms.remove().await;
        self.persist().await;
        info
    }

    pub async fn persist(&self) {
        self.store.persist(&self.pipeline, &self.transforms).await;
    }

    /// Stop everything and write a final snapshot
    pub async fn shutdown(&self) {
        self.watcher.lock().await.take();
        self.worker.set_enabled(false);
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        self.persist().await;
    }
}
