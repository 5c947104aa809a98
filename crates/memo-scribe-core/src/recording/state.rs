use std::fmt;

/// Lifecycle state of the recording controller.
///
/// Exactly one value is active at a time. `Error` variants compare equal when
/// their messages are equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// No capture session.
    #[default]
    Idle,
    /// Capturing audio.
    Recording,
    /// Capture session open but suspended.
    Paused,
    /// Stop issued; waiting for the device to finalize the file.
    Saving,
    /// A start or stop failed.
    Error(String),
}

impl RecordingState {
    /// True for `Recording` and `Paused`.
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }

    /// True only for `Paused`.
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// True when a new session may be started.
    pub fn accepts_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Error(_))
    }

    /// Failure message of an `Error` state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Recording => f.write_str("recording"),
            Self::Paused => f.write_str("paused"),
            Self::Saving => f.write_str("saving"),
            Self::Error(message) => write!(f, "error: {}", message),
        }
    }
}
