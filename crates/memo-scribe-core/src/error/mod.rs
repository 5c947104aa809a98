use error_location::ErrorLocation;
use thiserror::Error;
use uuid::Uuid;

/// Boxed underlying error preserved for diagnostics.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Recording lifecycle errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecordingServiceError {
    /// Operation requires an active (recording or paused) session.
    #[error("Not recording {location}")]
    NotRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Resume requires a paused session.
    #[error("Not paused {location}")]
    NotPaused {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture session is already active.
    #[error("Already recording {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Microphone access was refused by the platform.
    ///
    /// Devices report this when the backend says the input is blocked by
    /// privacy settings; other device failures are `AudioEngineError`.
    #[error("Microphone permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device failed.
    #[error("Audio engine error: {source} {location}")]
    AudioEngineError {
        /// Underlying device error.
        #[source]
        source: BoxedSource,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the recording file failed.
    #[error("File write error: {source} {location}")]
    FileWriteError {
        /// Underlying I/O error.
        #[source]
        source: BoxedSource,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Free disk space is below what a new recording requires.
    #[error("Insufficient disk space: {available} bytes available, {required} bytes required {location}")]
    InsufficientDiskSpace {
        /// Bytes available on the recordings volume.
        available: u64,
        /// Bytes required to start.
        required: u64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The requested audio format cannot be produced.
    #[error("Audio format not supported: {format} {location}")]
    FormatNotSupported {
        /// The requested format tag.
        format: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An incomplete recording could not be recovered.
    #[error("Recovery failed: {source} {location}")]
    RecoveryFailed {
        /// Underlying cause.
        #[source]
        source: BoxedSource,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Errors raised for persisted recordings.
#[derive(Error, Debug)]
pub enum RecordingError {
    /// The recording has no stored audio bytes.
    #[error("Recording has no audio data {location}")]
    NoAudioData {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No recording with this id exists in the store.
    #[error("Recording not found: {id} {location}")]
    NotFound {
        /// The missing recording id.
        id: Uuid,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The record store failed.
    #[error("Storage error: {source} {location}")]
    Storage {
        /// Underlying store error.
        #[source]
        source: BoxedSource,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing an exported audio file failed.
    #[error("Audio export write failed: {source} {location}")]
    WriteFailed {
        /// Underlying I/O error.
        #[source]
        source: BoxedSource,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Subtitle export errors.
#[derive(Error, Debug)]
pub enum SubtitleExportError {
    /// There are no segments to export.
    #[error("No segments to export {location}")]
    NoSegments {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// There are no conversation messages to export.
    #[error("No messages to export {location}")]
    NoMessages {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The rendered document is blank.
    #[error("Rendered subtitle content is empty {location}")]
    EmptyContent {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the subtitle file failed.
    #[error("Subtitle write error: {source} {location}")]
    WriteError {
        /// Underlying I/O error.
        #[source]
        source: BoxedSource,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The requested subtitle format is unknown.
    #[error("Invalid subtitle format: {format} {location}")]
    InvalidFormat {
        /// The requested format tag.
        format: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`RecordingServiceError`].
pub type ServiceResult<T> = std::result::Result<T, RecordingServiceError>;

/// Result type alias using [`RecordingError`].
pub type RecordResult<T> = std::result::Result<T, RecordingError>;

/// Result type alias using [`SubtitleExportError`].
pub type ExportResult<T> = std::result::Result<T, SubtitleExportError>;
