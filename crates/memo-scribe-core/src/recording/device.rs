use crate::{RecordingMetadata, ServiceResult};

use std::path::PathBuf;

use async_trait::async_trait;

/// A finished (or recovered) capture file.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutput {
    /// Location of the finalized audio file.
    pub file: PathBuf,
    /// Seconds of audio in the file.
    pub duration: f64,
}

/// Audio capture hardware and codec pipeline.
///
/// The device owns the temp file while a session is active. Implementations
/// persist [`RecordingMetadata`] for incomplete captures so they can be offered
/// again by [`check_for_incomplete_recordings`](Self::check_for_incomplete_recordings)
/// after a crash.
#[async_trait]
pub trait CaptureDevice: Send {
    /// Begin capturing into a new temp file described by `metadata`.
    ///
    /// Returns the temp file location.
    async fn start(&mut self, metadata: &RecordingMetadata) -> ServiceResult<PathBuf>;

    /// Stop capturing and finalize the temp file.
    ///
    /// The finished capture stays registered as incomplete until
    /// [`discard_incomplete_recording`](Self::discard_incomplete_recording)
    /// is called for it, so a failure to persist it can still be recovered.
    async fn stop(&mut self) -> ServiceResult<CaptureOutput>;

    /// Suspend capture.
    fn pause(&mut self) -> ServiceResult<()>;

    /// Continue a suspended capture.
    fn resume(&mut self) -> ServiceResult<()>;

    /// Flush captured audio to disk. Returns seconds captured so far.
    async fn force_save(&mut self) -> ServiceResult<f64>;

    /// Free bytes on the volume holding recordings.
    fn available_disk_space(&self) -> u64;

    /// Metadata of captures left incomplete by a previous run.
    fn check_for_incomplete_recordings(&self) -> Vec<RecordingMetadata>;

    /// Finalize an orphaned temp file into a usable artifact.
    async fn recover_recording(&mut self, metadata: &RecordingMetadata)
    -> ServiceResult<CaptureOutput>;

    /// Delete a temp file and its persisted metadata, once it has been
    /// stored or when the user gives it up.
    fn discard_incomplete_recording(&mut self, metadata: &RecordingMetadata) -> ServiceResult<()>;
}
