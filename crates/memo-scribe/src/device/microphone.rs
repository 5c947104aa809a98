use crate::{
    AppError,
    device::{InputStream, WavSink, disk_space, sidecar},
};

use memo_scribe_core::{
    AudioFormat, CaptureDevice, CaptureOutput, RecordingMetadata, RecordingServiceError,
    ServiceResult,
};

use std::{io::ErrorKind, panic::Location, path::PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

struct CaptureSession {
    metadata: RecordingMetadata,
    stream: InputStream,
    sink: WavSink,
}

/// Default system microphone recording to WAV files.
///
/// In-progress captures live in `recordings_dir` as `<id>.wav`, each with a
/// JSON sidecar that is rewritten on every checkpoint and on stop. The
/// sidecar is removed only by `discard_incomplete_recording`, once the capture
/// has been stored. Sidecars without an active session are reported as
/// incomplete recordings.
pub struct MicrophoneDevice {
    recordings_dir: PathBuf,
    session: Option<CaptureSession>,
}

impl MicrophoneDevice {
    /// Device writing captures into `recordings_dir`.
    pub fn new(recordings_dir: impl Into<PathBuf>) -> Self {
        Self {
            recordings_dir: recordings_dir.into(),
            session: None,
        }
    }

    #[track_caller]
    fn session_mut(&mut self) -> ServiceResult<&mut CaptureSession> {
        self.session
            .as_mut()
            .ok_or_else(|| RecordingServiceError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Moves buffered samples into the WAV file and rewrites its header.
    #[track_caller]
    fn checkpoint(session: &mut CaptureSession) -> ServiceResult<f64> {
        let samples = session.stream.drain();
        session.sink.write_samples(&samples).map_err(file_write)?;
        session.sink.flush().map_err(file_write)
    }
}

#[async_trait]
impl CaptureDevice for MicrophoneDevice {
    #[instrument(skip(self, metadata), fields(recording_id = %metadata.id))]
    async fn start(&mut self, metadata: &RecordingMetadata) -> ServiceResult<PathBuf> {
        if metadata.format != AudioFormat::Wav {
            return Err(RecordingServiceError::FormatNotSupported {
                format: metadata.format.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.session.is_some() {
            return Err(RecordingServiceError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        tokio::fs::create_dir_all(&self.recordings_dir)
            .await
            .map_err(|e| file_write(AppError::from(e)))?;

        let path = self
            .recordings_dir
            .join(format!("{}.{}", metadata.id, metadata.format.file_extension()));

        let stream = InputStream::open().await.map_err(audio_engine)?;
        let format = stream.format();

        let sink = match WavSink::create(&path, format.sample_rate, format.channels) {
            Ok(sink) => sink,
            Err(e) => {
                drop(stream.close());
                return Err(file_write(e));
            }
        };

        let metadata = metadata.clone().with_temp_file(&path);
        if let Err(e) = sidecar::write(&metadata, &path) {
            drop(stream.close());
            return Err(file_write(e));
        }

        info!(path = ?path, "Microphone capture started");

        self.session = Some(CaptureSession {
            metadata,
            stream,
            sink,
        });

        Ok(path)
    }

    #[instrument(skip(self))]
    async fn stop(&mut self) -> ServiceResult<CaptureOutput> {
        let session = self
            .session
            .take()
            .ok_or_else(|| RecordingServiceError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let CaptureSession {
            metadata,
            stream,
            mut sink,
        } = session;

        let samples = tokio::task::spawn_blocking(move || stream.close())
            .await
            .map_err(|e| RecordingServiceError::AudioEngineError {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        sink.write_samples(&samples).map_err(file_write)?;
        let file = sink.path().to_path_buf();
        let duration = sink.finalize().map_err(file_write)?;

        // The sidecar stays until the capture is stored and discarded.
        let metadata = metadata.checkpointed(duration, Utc::now());
        if let Err(e) = sidecar::write(&metadata, &file) {
            warn!(recording_id = %metadata.id, error = %e, "Failed to update sidecar");
        }

        Ok(CaptureOutput { file, duration })
    }

    #[track_caller]
    fn pause(&mut self) -> ServiceResult<()> {
        let session = self.session_mut()?;
        session.stream.pause().map_err(audio_engine)
    }

    #[track_caller]
    fn resume(&mut self) -> ServiceResult<()> {
        let session = self.session_mut()?;
        session.stream.resume().map_err(audio_engine)
    }

    async fn force_save(&mut self) -> ServiceResult<f64> {
        let session = self.session_mut()?;
        let duration = Self::checkpoint(session)?;

        let metadata = session.metadata.clone().checkpointed(duration, Utc::now());
        sidecar::write(&metadata, session.sink.path()).map_err(file_write)?;
        session.metadata = metadata;

        debug!(duration_secs = duration, "Capture checkpointed");

        Ok(duration)
    }

    fn available_disk_space(&self) -> u64 {
        match disk_space::available_space(&self.recordings_dir) {
            Some(available) => available,
            None => {
                warn!(dir = ?self.recordings_dir, "Could not determine free disk space");
                u64::MAX
            }
        }
    }

    fn check_for_incomplete_recordings(&self) -> Vec<RecordingMetadata> {
        let active = self.session.as_ref().map(|s| s.metadata.id);
        sidecar::scan(&self.recordings_dir)
            .into_iter()
            .filter(|m| Some(m.id) != active)
            .collect()
    }

    #[instrument(skip(self, metadata), fields(recording_id = %metadata.id))]
    async fn recover_recording(
        &mut self,
        metadata: &RecordingMetadata,
    ) -> ServiceResult<CaptureOutput> {
        let file = metadata
            .temp_file()
            .ok_or_else(|| RecordingServiceError::RecoveryFailed {
                source: "recording has no temp file".into(),
                location: ErrorLocation::from(Location::caller()),
            })?
            .to_path_buf();

        let duration =
            WavSink::recover(&file).map_err(|e| RecordingServiceError::RecoveryFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(CaptureOutput { file, duration })
    }

    #[track_caller]
    fn discard_incomplete_recording(&mut self, metadata: &RecordingMetadata) -> ServiceResult<()> {
        let Some(file) = metadata.temp_file() else {
            return Ok(());
        };

        match std::fs::remove_file(file) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(file_write(AppError::from(e))),
        }

        sidecar::remove(file).map_err(file_write)?;

        debug!(file = ?file, "Incomplete capture removed");

        Ok(())
    }
}

#[track_caller]
fn file_write(e: AppError) -> RecordingServiceError {
    RecordingServiceError::FileWriteError {
        source: Box::new(e),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Maps a stream failure, keeping a refused microphone distinguishable.
#[track_caller]
pub(crate) fn audio_engine(e: AppError) -> RecordingServiceError {
    match e {
        AppError::PermissionDenied { reason, .. } => {
            warn!(reason = %reason, "Microphone access denied");
            RecordingServiceError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            }
        }
        other => RecordingServiceError::AudioEngineError {
            source: Box::new(other),
            location: ErrorLocation::from(Location::caller()),
        },
    }
}
