use crate::{
    AudioFormat, CaptureDevice, ConversationMessage, ExportResult, RecordResult, RecordStore,
    Recording, RecordingController, RecordingError, RecordingMetadata, RecordingNotification,
    RecordingServiceError, RecordingState, ServiceResult, Session, SubtitleExportError,
    SubtitleExportOptions, SubtitleExporter, service::ExportGuard,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Application-facing façade over recording, persistence, and export.
///
/// Lifecycle calls go to the [`RecordingController`]; finished captures are
/// handed to the [`RecordStore`]; transcripts are rendered by the
/// [`SubtitleExporter`].
///
/// # Thread Safety
///
/// Same contract as [`RecordingController`]: one caller, lifecycle calls
/// awaited to completion before the next is issued.
pub struct RecordingService<D, S, E>
where
    D: CaptureDevice,
    S: RecordStore,
    E: SubtitleExporter,
{
    controller: RecordingController<D>,
    store: S,
    exporter: E,
    export_dir: PathBuf,
    selected_recording: Option<Uuid>,
    is_exporting: AtomicBool,
}

impl<D, S, E> RecordingService<D, S, E>
where
    D: CaptureDevice,
    S: RecordStore,
    E: SubtitleExporter,
{
    /// Creates a service exporting audio into the system temp directory.
    pub fn new(controller: RecordingController<D>, store: S, exporter: E) -> Self {
        Self {
            controller,
            store,
            exporter,
            export_dir: std::env::temp_dir(),
            selected_recording: None,
            is_exporting: AtomicBool::new(false),
        }
    }

    /// Sets the directory exported audio files are written to.
    pub fn with_export_dir(mut self, export_dir: impl Into<PathBuf>) -> Self {
        self.export_dir = export_dir.into();
        self
    }

    // --- Recording lifecycle ---

    /// Starts a capture session. See [`RecordingController::start`].
    pub async fn start_recording(&mut self, format: AudioFormat) -> ServiceResult<()> {
        self.controller.start(format).await
    }

    /// Pauses the capture session. See [`RecordingController::pause`].
    #[track_caller]
    pub fn pause_recording(&mut self) -> ServiceResult<()> {
        self.controller.pause()
    }

    /// Resumes the capture session. See [`RecordingController::resume`].
    #[track_caller]
    pub fn resume_recording(&mut self) -> ServiceResult<()> {
        self.controller.resume()
    }

    /// Stops the capture session and persists the finished file.
    ///
    /// The device keeps the finished capture registered as incomplete until
    /// its bytes are in the store; only then is it discarded. If reading or
    /// storing fails the capture stays on disk, is offered again by
    /// [`check_for_incomplete_recordings`](Self::check_for_incomplete_recordings),
    /// and the error slot is set.
    ///
    /// # Errors
    ///
    /// The controller's stop errors, or `FileWriteError` when the finished file
    /// cannot be read or stored.
    #[instrument(skip(self))]
    pub async fn stop_recording(&mut self) -> ServiceResult<Recording> {
        let metadata = self.controller.stop().await?;

        let Some(file) = metadata.temp_file().map(Path::to_path_buf) else {
            return Err(self.controller.report_error(
                RecordingServiceError::FileWriteError {
                    source: "finished recording has no file".into(),
                    location: ErrorLocation::from(Location::caller()),
                },
            ));
        };

        let audio_data = match tokio::fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Err(self.controller.report_error(
                    RecordingServiceError::FileWriteError {
                        source: Box::new(e),
                        location: ErrorLocation::from(Location::caller()),
                    },
                ));
            }
        };

        let recording = Recording::new(
            metadata.id,
            metadata.start_time,
            metadata.duration,
            metadata.format,
            Some(audio_data),
        );

        if let Err(e) = self.store.create(recording.clone()).await {
            return Err(self.controller.report_error(
                RecordingServiceError::FileWriteError {
                    source: Box::new(e),
                    location: ErrorLocation::from(Location::caller()),
                },
            ));
        }

        if let Err(e) = self.controller.discard_recording(&metadata) {
            warn!(file = ?file, error = %e, "Recording saved, but temp artifacts remain");
        }

        info!(
            recording_id = %recording.id,
            duration_secs = recording.duration,
            "Recording saved"
        );

        Ok(recording)
    }

    /// Checkpoints the capture session. Never fails.
    pub async fn force_save(&mut self) {
        self.controller.force_save().await;
    }

    /// Re-queries free disk space.
    pub fn refresh_disk_space(&mut self) -> u64 {
        self.controller.refresh_disk_space()
    }

    // --- Crash recovery ---

    /// Captures a previous run left incomplete.
    pub fn check_for_incomplete_recordings(&self) -> Vec<RecordingMetadata> {
        self.controller.check_for_incomplete_recordings()
    }

    /// Finalizes an incomplete capture and persists it as a new recording.
    ///
    /// The orphaned temp file and its persisted metadata are removed once the
    /// recording is stored, so the capture is not offered again.
    ///
    /// # Errors
    ///
    /// `RecoveryFailed` when the file cannot be finalized, read, or stored.
    #[instrument(skip(self, metadata), fields(recording_id = %metadata.id))]
    pub async fn recover_recording(
        &mut self,
        metadata: &RecordingMetadata,
    ) -> ServiceResult<Recording> {
        let output = self.controller.recover_recording(metadata).await?;

        let audio_data = tokio::fs::read(&output.file).await.map_err(|e| {
            RecordingServiceError::RecoveryFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        // Fall back to the last checkpoint when the device cannot tell.
        let duration = if output.duration > 0.0 {
            output.duration
        } else {
            metadata.duration
        };

        let recording = Recording::new(
            metadata.id,
            metadata.start_time,
            duration,
            metadata.format,
            Some(audio_data),
        );

        self.store
            .create(recording.clone())
            .await
            .map_err(|e| RecordingServiceError::RecoveryFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let recovered = metadata.clone().with_temp_file(output.file);
        if let Err(e) = self.controller.discard_recording(&recovered) {
            warn!(error = %e, "Recovered recording stored, but temp artifacts remain");
        }

        info!(duration_secs = duration, "Recovered recording saved");

        Ok(recording)
    }

    /// Deletes an incomplete capture. See [`RecordingController::discard_recording`].
    #[track_caller]
    pub fn discard_recording(&mut self, metadata: &RecordingMetadata) -> ServiceResult<()> {
        self.controller.discard_recording(metadata)
    }

    // --- Derived views ---

    /// Current lifecycle state.
    pub fn state(&self) -> &RecordingState {
        self.controller.state()
    }

    /// True while recording or paused.
    pub fn is_recording(&self) -> bool {
        self.controller.is_recording()
    }

    /// True only while paused.
    pub fn is_paused(&self) -> bool {
        self.controller.is_paused()
    }

    /// Seconds captured as of the last checkpoint.
    pub fn current_duration(&self) -> f64 {
        self.controller.current_duration()
    }

    /// Current duration as `MM:SS`.
    pub fn formatted_current_duration(&self) -> String {
        self.controller.formatted_current_duration()
    }

    /// True when the last disk query saw less than 100 MiB free.
    pub fn is_disk_space_low(&self) -> bool {
        self.controller.is_disk_space_low()
    }

    /// Message of the most recent lifecycle failure.
    pub fn error_message(&self) -> Option<&str> {
        self.controller.error_message()
    }

    /// Subscribes to controller notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingNotification> {
        self.controller.subscribe()
    }

    /// The underlying controller.
    pub fn controller(&self) -> &RecordingController<D> {
        &self.controller
    }

    /// The underlying controller, mutably.
    pub fn controller_mut(&mut self) -> &mut RecordingController<D> {
        &mut self.controller
    }

    // --- Library ---

    /// Every stored recording, newest first.
    pub async fn recordings(&self) -> RecordResult<Vec<Recording>> {
        self.store.fetch_all().await
    }

    /// One stored recording.
    ///
    /// # Errors
    ///
    /// `NotFound` when no recording has this id.
    pub async fn recording(&self, id: Uuid) -> RecordResult<Recording> {
        self.store
            .fetch(id)
            .await?
            .ok_or_else(|| RecordingError::NotFound {
                id,
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Marks a recording as selected, or clears the selection.
    pub fn select_recording(&mut self, id: Option<Uuid>) {
        self.selected_recording = id;
    }

    /// Id of the selected recording.
    pub fn selected_recording(&self) -> Option<Uuid> {
        self.selected_recording
    }

    /// Deletes a stored recording, clearing the selection if it pointed at it.
    #[instrument(skip(self))]
    pub async fn delete_recording(&mut self, id: Uuid) -> RecordResult<()> {
        self.store.delete(id).await?;

        if self.selected_recording == Some(id) {
            self.selected_recording = None;
        }

        info!(recording_id = %id, "Recording deleted");

        Ok(())
    }

    /// Attaches a transcript to a stored recording.
    #[instrument(skip(self, session), fields(segment_count = session.segments().len()))]
    pub async fn attach_session(&mut self, id: Uuid, session: Session) -> RecordResult<Recording> {
        let mut recording = self.recording(id).await?;
        recording.attach_session(session);
        self.store.update(recording.clone()).await?;

        info!(recording_id = %id, "Session attached");

        Ok(recording)
    }

    // --- Export ---

    /// True while an export is running.
    pub fn is_exporting(&self) -> bool {
        self.is_exporting.load(Ordering::Acquire)
    }

    /// Writes a recording's audio bytes to a new file with its format's
    /// extension.
    ///
    /// # Errors
    ///
    /// `NoAudioData` when the recording has no bytes; `WriteFailed` on I/O
    /// failure.
    #[instrument(skip(self, recording), fields(recording_id = %recording.id))]
    pub async fn export_audio(&self, recording: &Recording) -> RecordResult<PathBuf> {
        let _exporting = ExportGuard::raise(&self.is_exporting);

        let Some(audio_data) = recording.audio_data.as_deref() else {
            return Err(RecordingError::NoAudioData {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| RecordingError::WriteFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let suffix = format!(".{}", recording.format.file_extension());
        let (_, path) = tempfile::Builder::new()
            .prefix("recording-")
            .suffix(&suffix)
            .tempfile_in(&self.export_dir)
            .map_err(|e| RecordingError::WriteFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .keep()
            .map_err(|e| RecordingError::WriteFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        tokio::fs::write(&path, audio_data)
            .await
            .map_err(|e| RecordingError::WriteFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(path = ?path, bytes = audio_data.len(), "Audio exported");

        Ok(path)
    }

    /// Exports a recording's transcript as subtitles.
    ///
    /// # Errors
    ///
    /// `NoSegments` when the recording has no session or an empty one;
    /// otherwise the exporter's errors.
    #[instrument(skip(self, recording), fields(recording_id = %recording.id))]
    pub async fn export_subtitles(
        &self,
        recording: &Recording,
        options: &SubtitleExportOptions,
    ) -> ExportResult<PathBuf> {
        let _exporting = ExportGuard::raise(&self.is_exporting);

        let segments = match &recording.session {
            Some(session) if !session.is_empty() => session.segments(),
            _ => {
                return Err(SubtitleExportError::NoSegments {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        self.exporter.export(segments, options).await
    }

    /// Exports a live conversation that has not been materialized into a
    /// session.
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn export_conversation(
        &self,
        messages: &[ConversationMessage],
        session_start: DateTime<Utc>,
        options: &SubtitleExportOptions,
    ) -> ExportResult<PathBuf> {
        let _exporting = ExportGuard::raise(&self.is_exporting);

        self.exporter
            .export_messages(messages, session_start, options)
            .await
    }

    /// Renders a recording's transcript without writing a file.
    pub fn subtitle_preview(&self, recording: &Recording, options: &SubtitleExportOptions) -> String {
        recording
            .session
            .as_ref()
            .map(|session| self.exporter.generate_content(session.segments(), options))
            .unwrap_or_default()
    }
}
