use memo_scribe_core::{RecordingError, RecordingServiceError, SubtitleExportError};

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the memo-scribe binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Recording lifecycle error from memo-scribe-core.
    #[error("Recording error: {source} {location}")]
    Recording {
        /// The underlying lifecycle error.
        #[source]
        source: RecordingServiceError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Recording library error from memo-scribe-core.
    #[error("Library error: {source} {location}")]
    Library {
        /// The underlying library error.
        #[source]
        source: RecordingError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Subtitle export error from memo-scribe-core.
    #[error("Export error: {source} {location}")]
    Export {
        /// The underlying export error.
        #[source]
        source: SubtitleExportError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Audio input device failure.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The platform refused access to the microphone.
    #[error("Microphone access denied: {reason} {location}")]
    PermissionDenied {
        /// Platform message.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// WAV encoding or decoding failure.
    #[error("WAV error: {source} {location}")]
    Wav {
        /// The underlying hound error.
        #[source]
        source: hound::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// JSON metadata could not be encoded or decoded.
    #[error("Metadata error: {source} {location}")]
    Metadata {
        /// The underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A stdin command could not be parsed.
    #[error("Invalid command '{input}': {reason} {location}")]
    CommandParse {
        /// The rejected input line.
        input: String,
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From impls with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<RecordingServiceError> for AppError {
    #[track_caller]
    fn from(source: RecordingServiceError) -> Self {
        AppError::Recording {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<RecordingError> for AppError {
    #[track_caller]
    fn from(source: RecordingError) -> Self {
        AppError::Library {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<SubtitleExportError> for AppError {
    #[track_caller]
    fn from(source: SubtitleExportError) -> Self {
        AppError::Export {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<hound::Error> for AppError {
    #[track_caller]
    fn from(source: hound::Error) -> Self {
        AppError::Wav {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        AppError::Metadata {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
