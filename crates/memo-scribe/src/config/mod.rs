#[allow(clippy::module_inception)]
mod config;
mod export_config;
mod recording_config;
mod storage_config;

pub(crate) use {
    config::Config, export_config::ExportConfig, recording_config::RecordingConfig,
    storage_config::StorageConfig,
};

use memo_scribe_core::{AudioFormat, LOW_DISK_SPACE_THRESHOLD};

pub(crate) const DEFAULT_FORMAT: AudioFormat = AudioFormat::Wav;
pub(crate) const DEFAULT_REQUIRED_DISK_SPACE_BYTES: u64 = LOW_DISK_SPACE_THRESHOLD;
pub(crate) const DEFAULT_AUTO_SAVE_INTERVAL_SECS: u64 = 30;

pub(crate) fn default_format() -> AudioFormat {
    DEFAULT_FORMAT
}

pub(crate) fn default_required_disk_space_bytes() -> u64 {
    DEFAULT_REQUIRED_DISK_SPACE_BYTES
}

pub(crate) fn default_auto_save_interval_secs() -> u64 {
    DEFAULT_AUTO_SAVE_INTERVAL_SECS
}
