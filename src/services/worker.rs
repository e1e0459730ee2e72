//! Single consumer of the upload queue.
//!
//! The worker sleeps on a [`Notify`] until something calls
//! [`DeliveryWorker::ensure_draining`], then delivers queue entries head
//! first until the queue is empty, every remaining entry has failed during
//! this pass, or monitoring is switched off.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, RwLock};

use super::ledger::base_name;
use super::pipeline::Pipeline;
use super::store::StateStore;
use super::transforms::TransformSlot;
use super::uploader::{Destination, TransferError, Upload, UploadReceipt, Uploader};
use crate::error::RenderError;
use crate::models::DeliveryConfig;
use crate::rendering::{mime_for, render_graded};

/// Bounded retry with exponential delay, plus a pause between entries
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub cooldown: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_delay_ms),
            multiplier: config.retry_multiplier,
            cooldown: Duration::from_millis(config.cooldown_ms),
        }
    }

    /// Delay after the failed attempt with 0-based index `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(0.0).powi(attempt as i32);
        self.base_delay.mul_f64(factor)
    }
}

/// What one drain pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
}

pub struct DeliveryWorker {
    pipeline: Arc<Pipeline>,
    transforms: Arc<TransformSlot>,
    store: Arc<StateStore>,
    uploader: Arc<dyn Uploader>,
    destination: RwLock<Option<Destination>>,
    policy: RetryPolicy,
    jpeg_quality: u8,
    wake: Notify,
    enabled: AtomicBool,
    draining: AtomicBool,
    drain_lock: Mutex<()>,
}

impl DeliveryWorker {
    pub fn new(
        pipeline: Arc<Pipeline>,
        transforms: Arc<TransformSlot>,
        store: Arc<StateStore>,
        uploader: Arc<dyn Uploader>,
        policy: RetryPolicy,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            pipeline,
            transforms,
            store,
            uploader,
            destination: RwLock::new(None),
            policy,
            jpeg_quality,
            wake: Notify::new(),
            enabled: AtomicBool::new(false),
            draining: AtomicBool::new(false),
            drain_lock: Mutex::new(()),
        }
    }

    pub async fn set_destination(&self, destination: Option<Destination>) {
        *self.destination.write().await = destination;
    }

    pub async fn destination(&self) -> Option<Destination> {
        self.destination.read().await.clone()
    }

    /// Allow or stop draining; an in-flight entry always finishes
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Request a drain pass; requests made while one runs coalesce into
    /// a single follow-up pass
    pub fn ensure_draining(&self) {
        self.wake.notify_one();
    }

    /// Run the wake-up loop until the task is aborted
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                self.wake.notified().await;
                let report = self.drain().await;
                if report != DrainReport::default() {
                    tracing::info!(
                        delivered = report.delivered,
                        failed = report.failed,
                        dropped = report.dropped,
                        "Drain pass finished"
                    );
                }
            }
        })
    }

    /// Run one drain pass now; returns immediately if one is already running
    pub async fn drain(&self) -> DrainReport {
        let Ok(_guard) = self.drain_lock.try_lock() else {
            tracing::debug!("Drain already in progress");
            return DrainReport::default();
        };
        self.draining.store(true, Ordering::SeqCst);
        let report = self.drain_pass().await;
        self.draining.store(false, Ordering::SeqCst);
        report
    }

    async fn drain_pass(&self) -> DrainReport {
        let mut report = DrainReport::default();
        let mut parked: HashSet<PathBuf> = HashSet::new();

        loop {
            if !self.is_enabled() {
                break;
            }
            let Some(destination) = self.destination().await else {
                tracing::warn!("No upload destination configured");
                break;
            };
            let Some(entry) = self.pipeline.peek().await else {
                break;
            };
            if parked.contains(&entry.path) {
                let queue_size = self.pipeline.queue_len().await;
                tracing::debug!(queue_size, "Every remaining entry failed this pass");
                break;
            }

            let path = entry.path;
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tracing::warn!(path = %path.display(), "File disappeared, dropping from queue");
                self.pipeline.drop_entry(&path).await;
                report.dropped += 1;
                self.store.persist(&self.pipeline, &self.transforms).await;
                continue;
            }

            match self.deliver(&destination, &path).await {
                Ok(receipt) => {
                    tracing::info!(
                        path = %path.display(),
                        session = ?receipt.session_code,
                        "Upload succeeded"
                    );
                    self.pipeline.complete(&path, receipt.session_code).await;
                    report.delivered += 1;
                }
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Upload failed, moving to end of queue"
                    );
                    self.pipeline.park(&path).await;
                    parked.insert(path);
                    report.failed += 1;
                }
            }
            self.store.persist(&self.pipeline, &self.transforms).await;

            if !self.policy.cooldown.is_zero() {
                tokio::time::sleep(self.policy.cooldown).await;
            }
        }

        report
    }

    /// Attempt one entry up to `max_attempts` times
    async fn deliver(
        &self,
        destination: &Destination,
        path: &Path,
    ) -> Result<UploadReceipt, TransferError> {
        let mut attempt: u32 = 0;
        loop {
            let result = match self.prepare(path).await {
                Ok(upload) => self.uploader.upload(destination, upload).await,
                Err(e) => Err(e),
            };
            let error = match result {
                Ok(receipt) => return Ok(receipt),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            attempt += 1;
            if attempt >= self.policy.max_attempts {
                return Err(error);
            }
            let delay = self.policy.delay_for(attempt - 1);
            tracing::warn!(
                path = %path.display(),
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Upload attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Read the file, graded through the active transform if there is one
    async fn prepare(&self, path: &Path) -> Result<Upload, TransferError> {
        let transform = self.transforms.current().await;
        let bytes = if transform.is_active() {
            let source = path.to_path_buf();
            let quality = self.jpeg_quality;
            tokio::task::spawn_blocking(move || match transform.grade() {
                Some(grade) => render_graded(&source, grade, quality),
                None => std::fs::read(&source).map_err(RenderError::from),
            })
            .await
            .map_err(|e| TransferError::Prepare(e.to_string()))?
            .map_err(|e| TransferError::Prepare(e.to_string()))?
        } else {
            tokio::fs::read(path)
                .await
                .map_err(|e| TransferError::Prepare(e.to_string()))?
        };

        Ok(Upload {
            file_name: base_name(path).unwrap_or_default(),
            mime: mime_for(path),
            bytes,
            session: self.pipeline.session().await,
        })
    }
}
