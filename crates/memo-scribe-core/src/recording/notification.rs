/// Name token of the low-disk-space notification.
pub const DISK_SPACE_LOW_NOTIFICATION: &str = "recordingDiskSpaceLow";

/// Notifications broadcast by the recording controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingNotification {
    /// Free space on the recordings volume dropped below the low threshold.
    DiskSpaceLow {
        /// Bytes available at the time of the check.
        available: u64,
    },
}

impl RecordingNotification {
    /// Fixed name token identifying the notification channel.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DiskSpaceLow { .. } => DISK_SPACE_LOW_NOTIFICATION,
        }
    }
}
