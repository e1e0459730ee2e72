//! Shared queue, ledger, counters and session binding behind one lock.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::discovery::{DiscoveryRules, Readiness};
use super::ledger::{base_name, DeliveryLedger};
use super::queue::{QueueEntry, UploadQueue};
use crate::models::{PersistedState, RunCounters};

/// Outcome of offering a discovered file to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    Unsupported,
    AlreadyDelivered,
    AlreadyQueued,
    Settling,
    Missing,
}

/// Counter snapshot returned by the stats endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_files: u64,
    pub uploaded_count: u64,
    pub failed_count: u64,
    pub queue_size: usize,
    pub current_session: Option<String>,
}

#[derive(Debug, Default)]
struct PipelineState {
    queue: UploadQueue,
    ledger: DeliveryLedger,
    counters: RunCounters,
    session: Option<String>,
}

impl PipelineState {
    fn known(&self, name: &str) -> Option<Admission> {
        if self.ledger.contains(name) {
            Some(Admission::AlreadyDelivered)
        } else if self.queue.contains_name(name) {
            Some(Admission::AlreadyQueued)
        } else {
            None
        }
    }
}

/// Queue, ledger, counters and session, mutated only through this type
pub struct Pipeline {
    rules: DiscoveryRules,
    state: Mutex<PipelineState>,
}

impl Pipeline {
    pub fn new(rules: DiscoveryRules) -> Self {
        Self {
            rules,
            state: Mutex::new(PipelineState::default()),
        }
    }

    pub fn rules(&self) -> &DiscoveryRules {
        &self.rules
    }

    /// Run every admission check without changing anything
    async fn screen(&self, path: &Path) -> Result<String, Admission> {
        if !self.rules.is_supported(path) {
            return Err(Admission::Unsupported);
        }
        let name = base_name(path).ok_or(Admission::Unsupported)?;

        if let Some(rejected) = self.state.lock().await.known(&name) {
            return Err(rejected);
        }

        // Filesystem check happens outside the lock
        match self.rules.readiness(path).await {
            Readiness::Settled => Ok(name),
            Readiness::Settling => Err(Admission::Settling),
            Readiness::Missing => Err(Admission::Missing),
        }
    }

    /// Whether a discovered file would be admitted right now
    pub async fn should_enqueue(&self, path: &Path) -> bool {
        self.screen(path).await.is_ok()
    }

    /// Admit a discovered file: append it and count it as observed.
    ///
    /// The ledger and queue are checked again under the lock right before
    /// appending, so two concurrent offers of one file queue it once.
    pub async fn offer(&self, path: &Path) -> Admission {
        let name = match self.screen(path).await {
            Ok(name) => name,
            Err(rejected) => return rejected,
        };

        let mut state = self.state.lock().await;
        if let Some(rejected) = state.known(&name) {
            return rejected;
        }
        state.queue.push(path.to_path_buf());
        state.counters.total_files += 1;
        tracing::info!(
            path = %path.display(),
            queue_size = state.queue.len(),
            "Queued photo"
        );
        Admission::Queued
    }

    pub async fn peek(&self) -> Option<QueueEntry> {
        self.state.lock().await.queue.peek().cloned()
    }

    pub async fn queue_len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub async fn queued_paths(&self) -> Vec<PathBuf> {
        self.state.lock().await.queue.paths()
    }

    pub async fn queued_entries(&self) -> Vec<QueueEntry> {
        self.state.lock().await.queue.entries().cloned().collect()
    }

    pub async fn session(&self) -> Option<String> {
        self.state.lock().await.session.clone()
    }

    /// Remove an entry whose file has vanished
    pub async fn drop_entry(&self, path: &Path) {
        self.state.lock().await.queue.remove(path);
    }

    /// Record a delivery: ledger, counter, session binding and dequeue
    pub async fn complete(&self, path: &Path, session: Option<String>) {
        let mut state = self.state.lock().await;
        if let Some(name) = base_name(path) {
            state.ledger.record(name);
        }
        state.counters.uploaded_count += 1;
        if state.session.is_none() {
            if let Some(code) = session {
                tracing::info!(session = %code, "Bound upload session");
                state.session = Some(code);
            }
        }
        state.queue.remove(path);
    }

    /// Count a failed entry and move it behind everything else
    pub async fn park(&self, path: &Path) {
        let mut state = self.state.lock().await;
        state.counters.failed_count += 1;
        state.queue.rotate(path);
    }

    pub async fn clear_session(&self) {
        self.state.lock().await.session = None;
    }

    /// Zero the counters and forget the ledger and session in one step.
    ///
    /// Pending entries stay queued.
    pub async fn reset_history(&self) -> Stats {
        let mut state = self.state.lock().await;
        state.ledger.clear();
        state.session = None;
        state.counters = RunCounters::default();
        Self::stats_of(&state)
    }

    pub async fn stats(&self) -> Stats {
        Self::stats_of(&*self.state.lock().await)
    }

    fn stats_of(state: &PipelineState) -> Stats {
        Stats {
            total_files: state.counters.total_files,
            uploaded_count: state.counters.uploaded_count,
            failed_count: state.counters.failed_count,
            queue_size: state.queue.len(),
            current_session: state.session.clone(),
        }
    }

    /// Copy the persistable part of the state into a document.
    ///
    /// The transform selector and timestamp are filled in by the caller.
    pub async fn export(&self) -> PersistedState {
        let state = self.state.lock().await;
        PersistedState {
            queue: state.queue.paths(),
            ledger_entries: state.ledger.names(),
            counters: state.counters,
            session_binding: state.session.clone(),
            ..Default::default()
        }
    }

    /// Replace the state with a persisted document, without any filtering
    pub async fn restore(&self, document: &PersistedState) {
        let mut state = self.state.lock().await;
        state.queue = UploadQueue::from_paths(document.queue.iter().cloned());
        state.ledger = DeliveryLedger::from_names(document.ledger_entries.iter().cloned());
        state.counters = document.counters;
        state.session = document.session_binding.clone();
    }
}
