pub mod discovery;
pub mod file_watcher;
pub mod ledger;
pub mod pipeline;
pub mod queue;
pub mod relay;
pub mod store;
pub mod transforms;
pub mod uploader;
pub mod worker;

pub use discovery::{DiscoveryRules, Readiness};
pub use file_watcher::{FileWatcher, WatchError};
pub use ledger::DeliveryLedger;
pub use pipeline::{Admission, Pipeline, Stats};
pub use queue::{QueueEntry, UploadQueue};
pub use relay::{MonitorError, MonitorRequest, QueueStatus, Relay};
pub use store::{StateStore, StoreError};
pub use transforms::{ActiveTransform, TransformInfo, TransformSlot};
pub use uploader::{Destination, HttpUploader, TransferError, Upload, UploadReceipt, Uploader};
pub use worker::{DeliveryWorker, DrainReport, RetryPolicy};
