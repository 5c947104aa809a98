use crate::{
    AudioFormat, CaptureDevice, CaptureOutput, RecordingMetadata, RecordingNotification,
    RecordingServiceError, RecordingState, ServiceResult, recording::format_duration,
};

use std::panic::Location;

use chrono::Utc;
use error_location::ErrorLocation;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Free space (100 MiB) below which the disk is reported as low.
pub const LOW_DISK_SPACE_THRESHOLD: u64 = 104_857_600;

const NOTIFICATION_CAPACITY: usize = 16;

/// Recording lifecycle state machine.
///
/// Owns the current [`RecordingMetadata`] and [`RecordingState`], mediates every
/// call into the capture device, and keeps a single error slot describing the
/// most recent failure.
///
/// # Thread Safety
///
/// Lifecycle operations take `&mut self` and must run to completion before the
/// next one is issued. There is no internal queue or lock; the owning handle is
/// the serialization point. Overlapping calls through some other sharing scheme
/// are a caller bug.
///
/// # Transitions
///
/// ```text
/// idle/error --start--> recording <--pause/resume--> paused
///                           |                           |
///                           +-----------stop------------+
///                                        |
///                                     saving --> idle | error
/// ```
pub struct RecordingController<D: CaptureDevice> {
    device: D,
    state: RecordingState,
    metadata: Option<RecordingMetadata>,
    error_message: Option<String>,
    available_disk_space: Option<u64>,
    required_disk_space: u64,
    notification_tx: broadcast::Sender<RecordingNotification>,
}

impl<D: CaptureDevice> RecordingController<D> {
    /// Creates an idle controller driving `device`.
    ///
    /// Starting requires [`LOW_DISK_SPACE_THRESHOLD`] free bytes unless changed
    /// with [`with_required_disk_space`](Self::with_required_disk_space).
    pub fn new(device: D) -> Self {
        let (notification_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            device,
            state: RecordingState::Idle,
            metadata: None,
            error_message: None,
            available_disk_space: None,
            required_disk_space: LOW_DISK_SPACE_THRESHOLD,
            notification_tx,
        }
    }

    /// Sets the free space a new recording requires.
    pub fn with_required_disk_space(mut self, bytes: u64) -> Self {
        self.required_disk_space = bytes;
        self
    }

    /// Starts a capture session.
    ///
    /// Accepted from `Idle` and `Error`. Refuses without touching the device
    /// when free disk space is below the required threshold.
    ///
    /// # Errors
    ///
    /// `AlreadyRecording` when a session is open (state unchanged);
    /// `InsufficientDiskSpace` or the device's own error otherwise, both of
    /// which move the state to `Error`.
    #[instrument(skip(self))]
    pub async fn start(&mut self, format: AudioFormat) -> ServiceResult<()> {
        self.error_message = None;

        if !self.state.accepts_start() {
            return Err(self.reject(RecordingServiceError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            }));
        }

        let available = self.refresh_disk_space();
        if available < self.required_disk_space {
            return Err(self.fail(RecordingServiceError::InsufficientDiskSpace {
                available,
                required: self.required_disk_space,
                location: ErrorLocation::from(Location::caller()),
            }));
        }

        let metadata = RecordingMetadata::new(format);

        match self.device.start(&metadata).await {
            Ok(temp_file) => {
                let metadata = metadata.with_temp_file(temp_file);
                info!(
                    recording_id = %metadata.id,
                    format = %format,
                    temp_file = ?metadata.temp_file,
                    "Recording started"
                );
                self.metadata = Some(metadata);
                self.state = RecordingState::Recording;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Suspends the active capture.
    ///
    /// # Errors
    ///
    /// `NotRecording` unless the state is `Recording`, or the device's error.
    /// Either way the state is left unchanged.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn pause(&mut self) -> ServiceResult<()> {
        self.error_message = None;

        if self.state != RecordingState::Recording {
            return Err(self.reject(RecordingServiceError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            }));
        }

        if let Err(e) = self.device.pause() {
            return Err(self.reject(e));
        }

        self.state = RecordingState::Paused;
        info!(recording_id = ?self.metadata.as_ref().map(|m| m.id), "Recording paused");

        Ok(())
    }

    /// Continues a paused capture.
    ///
    /// # Errors
    ///
    /// `NotPaused` unless the state is `Paused`, or the device's error.
    /// Either way the state is left unchanged.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn resume(&mut self) -> ServiceResult<()> {
        self.error_message = None;

        if self.state != RecordingState::Paused {
            return Err(self.reject(RecordingServiceError::NotPaused {
                location: ErrorLocation::from(Location::caller()),
            }));
        }

        if let Err(e) = self.device.resume() {
            return Err(self.reject(e));
        }

        self.state = RecordingState::Recording;
        info!(recording_id = ?self.metadata.as_ref().map(|m| m.id), "Recording resumed");

        Ok(())
    }

    /// Stops the capture and returns the completed metadata.
    ///
    /// The current metadata is cleared whether or not the device stops
    /// cleanly. A crash or failure between the device stop and this point is
    /// repaired through crash recovery, not here.
    ///
    /// # Errors
    ///
    /// `NotRecording` when no session is open (state unchanged); the device's
    /// error otherwise (state becomes `Error`).
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> ServiceResult<RecordingMetadata> {
        self.error_message = None;

        if !self.state.is_recording() {
            return Err(self.reject(RecordingServiceError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            }));
        }

        self.state = RecordingState::Saving;

        let result = self.device.stop().await;
        let metadata = self.metadata.take();

        let output = match result {
            Ok(output) => output,
            Err(e) => return Err(self.fail(e)),
        };

        let Some(metadata) = metadata else {
            return Err(self.fail(RecordingServiceError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            }));
        };

        let metadata = metadata.completed(output.file, output.duration);
        self.state = RecordingState::Idle;

        info!(
            recording_id = %metadata.id,
            duration_secs = metadata.duration,
            "Recording stopped"
        );

        Ok(metadata)
    }

    /// Asks the device to checkpoint the capture.
    ///
    /// Best-effort: failures are logged and never reach the caller, the state,
    /// or the error slot.
    #[instrument(skip(self))]
    pub async fn force_save(&mut self) {
        match self.device.force_save().await {
            Ok(duration) => {
                if let Some(metadata) = self.metadata.take() {
                    let metadata = metadata.checkpointed(duration, Utc::now());
                    debug!(
                        recording_id = %metadata.id,
                        duration_secs = duration,
                        "Checkpoint saved"
                    );
                    self.metadata = Some(metadata);
                }
            }
            Err(e) => {
                warn!(error = %e, "Checkpoint failed, recording continues");
            }
        }
    }

    /// Metadata of captures a previous run left incomplete.
    #[instrument(skip(self))]
    pub fn check_for_incomplete_recordings(&self) -> Vec<RecordingMetadata> {
        let candidates: Vec<RecordingMetadata> = self
            .device
            .check_for_incomplete_recordings()
            .into_iter()
            .filter(|m| !m.is_complete)
            .collect();

        if !candidates.is_empty() {
            info!(count = candidates.len(), "Incomplete recordings found");
        }

        candidates
    }

    /// Finalizes an orphaned capture.
    ///
    /// Operates on `metadata` only; the controller's own session, state, and
    /// error slot are untouched.
    ///
    /// # Errors
    ///
    /// `RecoveryFailed` when the metadata has no temp file, the file is
    /// missing or unreadable, or the device cannot finalize it.
    #[instrument(skip(self, metadata), fields(recording_id = %metadata.id))]
    pub async fn recover_recording(
        &mut self,
        metadata: &RecordingMetadata,
    ) -> ServiceResult<CaptureOutput> {
        let Some(temp_file) = metadata.temp_file() else {
            return Err(RecordingServiceError::RecoveryFailed {
                source: "recording has no temp file".into(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        if let Err(e) = tokio::fs::metadata(temp_file).await {
            return Err(RecordingServiceError::RecoveryFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let output = self
            .device
            .recover_recording(metadata)
            .await
            .map_err(|e| match e {
                RecordingServiceError::RecoveryFailed { .. } => e,
                other => RecordingServiceError::RecoveryFailed {
                    source: Box::new(other),
                    location: ErrorLocation::from(Location::caller()),
                },
            })?;

        info!(file = ?output.file, duration_secs = output.duration, "Recording recovered");

        Ok(output)
    }

    /// Deletes an orphaned capture's temp file.
    ///
    /// Succeeds when the file never existed.
    #[track_caller]
    #[instrument(skip(self, metadata), fields(recording_id = %metadata.id))]
    pub fn discard_recording(&mut self, metadata: &RecordingMetadata) -> ServiceResult<()> {
        self.device.discard_incomplete_recording(metadata)?;
        info!("Incomplete recording discarded");
        Ok(())
    }

    /// Queries free disk space and caches it.
    ///
    /// Broadcasts [`RecordingNotification::DiskSpaceLow`] when the value
    /// crosses below [`LOW_DISK_SPACE_THRESHOLD`].
    pub fn refresh_disk_space(&mut self) -> u64 {
        let was_low = self.is_disk_space_low();
        let available = self.device.available_disk_space();
        self.available_disk_space = Some(available);

        if !was_low && available < LOW_DISK_SPACE_THRESHOLD {
            warn!(available_bytes = available, "Disk space low");
            // No subscribers is fine.
            let _ = self
                .notification_tx
                .send(RecordingNotification::DiskSpaceLow { available });
        }

        available
    }

    /// Subscribes to controller notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingNotification> {
        self.notification_tx.subscribe()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    /// True while recording or paused.
    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// True only while paused.
    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Metadata of the open session.
    pub fn metadata(&self) -> Option<&RecordingMetadata> {
        self.metadata.as_ref()
    }

    /// Seconds captured as of the last checkpoint, or 0.
    pub fn current_duration(&self) -> f64 {
        self.metadata.as_ref().map_or(0.0, |m| m.duration)
    }

    /// [`current_duration`](Self::current_duration) as `MM:SS`.
    pub fn formatted_current_duration(&self) -> String {
        format_duration(self.current_duration())
    }

    /// Message of the most recent failure.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Free bytes seen by the last disk query.
    pub fn available_disk_space(&self) -> Option<u64> {
        self.available_disk_space
    }

    /// True when the last disk query saw less than [`LOW_DISK_SPACE_THRESHOLD`].
    pub fn is_disk_space_low(&self) -> bool {
        self.available_disk_space
            .is_some_and(|available| available < LOW_DISK_SPACE_THRESHOLD)
    }

    /// Free space a new recording requires.
    pub fn required_disk_space(&self) -> u64 {
        self.required_disk_space
    }

    /// The capture device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The capture device, mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Records a precondition failure: error slot only.
    fn reject(&mut self, error: RecordingServiceError) -> RecordingServiceError {
        warn!(error = %error, state = %self.state, "Operation rejected");
        self.error_message = Some(error.to_string());
        error
    }

    /// Records a failure after the device has released the capture: error
    /// slot only, state unchanged.
    pub(crate) fn report_error(&mut self, error: RecordingServiceError) -> RecordingServiceError {
        warn!(error = %error, "Finished recording could not be saved");
        self.error_message = Some(error.to_string());
        error
    }

    /// Records a lifecycle failure: error slot and `Error` state.
    fn fail(&mut self, error: RecordingServiceError) -> RecordingServiceError {
        let message = error.to_string();
        warn!(error = %message, "Recording operation failed");
        self.error_message = Some(message.clone());
        self.state = RecordingState::Error(message);
        error
    }
}
