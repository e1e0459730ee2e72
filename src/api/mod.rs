pub mod monitoring;
pub mod stats;
pub mod transform;

pub use monitoring::{handle_start_monitoring, handle_stop_monitoring, StopResponse};
pub use stats::{handle_queue, handle_reset_history, handle_stats};
pub use transform::{
    handle_activate_adjustment, handle_activate_preset, handle_activate_table, handle_presets,
    handle_remove_transform, handle_transform, PathRequest,
};
