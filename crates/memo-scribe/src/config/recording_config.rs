use crate::config::{
    DEFAULT_AUTO_SAVE_INTERVAL_SECS, DEFAULT_FORMAT, DEFAULT_REQUIRED_DISK_SPACE_BYTES,
    default_auto_save_interval_secs, default_format, default_required_disk_space_bytes,
};

use memo_scribe_core::AudioFormat;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Capture session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Format used by `start` when none is given.
    #[serde(default = "default_format")]
    pub default_format: AudioFormat,
    /// Free bytes required before a capture may start.
    #[serde(default = "default_required_disk_space_bytes")]
    pub required_disk_space_bytes: u64,
    /// Seconds between checkpoints of an active capture.
    #[serde(default = "default_auto_save_interval_secs")]
    pub auto_save_interval_secs: u64,
    /// Directory for in-progress captures (None = data directory).
    #[serde(default)]
    pub recordings_dir: Option<PathBuf>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            default_format: DEFAULT_FORMAT,
            required_disk_space_bytes: DEFAULT_REQUIRED_DISK_SPACE_BYTES,
            auto_save_interval_secs: DEFAULT_AUTO_SAVE_INTERVAL_SECS,
            recordings_dir: None,
        }
    }
}
