use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration loaded from photo-relay.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Folder to watch for new photos
    #[serde(default)]
    pub watch_folder: Option<PathBuf>,

    /// Upload endpoint
    #[serde(default)]
    pub api_url: Option<String>,

    /// Bearer token sent with every upload
    #[serde(default)]
    pub api_token: Option<String>,

    /// Where queue, ledger and counters are persisted
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Preset catalog (presets.json)
    #[serde(default)]
    pub presets_file: Option<PathBuf>,

    /// Start monitoring on launch when folder and URL are configured
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,

    /// JPEG quality for graded uploads
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

fn default_state_file() -> PathBuf {
    PathBuf::from("photo-relay-state.json")
}

fn default_auto_start() -> bool {
    true
}

fn default_jpeg_quality() -> u8 {
    92
}

/// Retry and pacing for the delivery worker
#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    /// Attempts per entry before it is parked at the tail
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Growth factor applied to the delay per attempt
    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: f64,

    /// Pause between queue entries
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Upload request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    3000
}

fn default_retry_multiplier() -> f64 {
    1.5
}

fn default_cooldown_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_multiplier: default_retry_multiplier(),
            cooldown_ms: default_cooldown_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Discovery filtering and re-scan cadence
#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    /// Minimum file age before it may be queued
    #[serde(default = "default_quiescence_ms")]
    pub quiescence_ms: u64,

    /// Interval between full folder re-scans (0 disables)
    #[serde(default = "default_rescan_secs")]
    pub rescan_secs: u64,

    /// Accepted file extensions, lowercase without dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_quiescence_ms() -> u64 {
    2000
}

fn default_rescan_secs() -> u64 {
    30
}

fn default_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "bmp", "webp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: default_quiescence_ms(),
            rescan_secs: default_rescan_secs(),
            extensions: default_extensions(),
        }
    }
}

/// Periodic snapshot cadence
#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    #[serde(default = "default_snapshot_secs")]
    pub snapshot_secs: u64,
}

fn default_snapshot_secs() -> u64 {
    30
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            snapshot_secs: default_snapshot_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        watch_folder = ?config.watch_folder,
                        api_url = ?config.api_url,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Upload timeout as a Duration
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery.timeout_secs)
    }

    /// Quiescence window as a Duration
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.discovery.quiescence_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            watch_folder: None,
            api_url: None,
            api_token: None,
            state_file: default_state_file(),
            presets_file: None,
            auto_start: default_auto_start(),
            jpeg_quality: default_jpeg_quality(),
            delivery: DeliveryConfig::default(),
            discovery: DiscoveryConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}
