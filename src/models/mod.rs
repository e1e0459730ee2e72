pub mod config;
pub mod snapshot;

pub use config::{AppConfig, DeliveryConfig, DiscoveryConfig, PersistenceConfig};
pub use snapshot::{PersistedState, RunCounters, TransformSelector};
