mod controller;
mod device;
mod duration;
mod metadata;
mod notification;
mod state;

pub use {
    controller::{LOW_DISK_SPACE_THRESHOLD, RecordingController},
    device::{CaptureDevice, CaptureOutput},
    duration::format_duration,
    metadata::RecordingMetadata,
    notification::{DISK_SPACE_LOW_NOTIFICATION, RecordingNotification},
    state::RecordingState,
};
