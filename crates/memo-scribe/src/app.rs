use crate::{
    AppCommand, AppError, AppResult, command::HELP, config::Config, device::MicrophoneDevice,
    store::FileRecordStore,
};

use memo_scribe_core::{
    RecordingController, RecordingNotification, RecordingService, SubtitleExportEngine,
    format_duration,
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
    time::MissedTickBehavior,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

type Service = RecordingService<MicrophoneDevice, FileRecordStore, SubtitleExportEngine>;

/// Main application state.
///
/// Owns the recording service and drives it from stdin commands, the
/// auto-save interval, and controller notifications on one task, so lifecycle
/// calls are always serialized.
pub struct App {
    service: Service,
    config: Config,
}

impl App {
    /// Wires the service to the microphone, the on-disk library, and the
    /// configured export directory.
    #[track_caller]
    #[instrument(skip(config))]
    pub(crate) fn new(config: Config) -> AppResult<Self> {
        let recordings_dir = config.recordings_dir()?;
        let library_dir = config.library_dir()?;
        let export_dir = config.export_dir()?;

        info!(
            recordings_dir = ?recordings_dir,
            library_dir = ?library_dir,
            export_dir = ?export_dir,
            "Directories resolved"
        );

        let controller = RecordingController::new(MicrophoneDevice::new(recordings_dir))
            .with_required_disk_space(config.recording.required_disk_space_bytes);
        let store = FileRecordStore::new(library_dir);
        let exporter = SubtitleExportEngine::with_output_dir(&export_dir);

        let service = RecordingService::new(controller, store, exporter).with_export_dir(export_dir);

        Ok(Self { service, config })
    }

    /// Run the main application event loop until `quit` or end of input.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Memo-Scribe starting");

        self.report_incomplete_recordings();
        self.service.refresh_disk_space();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut notifications = self.service.subscribe();

        let period = Duration::from_secs(self.config.recording.auto_save_interval_secs);
        let mut auto_save = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        auto_save.set_missed_tick_behavior(MissedTickBehavior::Skip);

        println!("{}", HELP);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            match line.parse::<AppCommand>() {
                                Ok(AppCommand::Quit) => {
                                    info!("Quit requested");
                                    break;
                                }
                                Ok(command) => {
                                    if let Err(e) = self.handle(command).await {
                                        error!(error = %e, "Command failed");
                                        println!("error: {}", e);
                                    }
                                }
                                Err(e) => println!("{}", e),
                            }
                        }
                        Ok(None) => {
                            info!("Input closed");
                            break;
                        }
                        Err(e) => {
                            error!(error = ?e, "Failed to read input");
                            break;
                        }
                    }
                }

                _ = auto_save.tick() => {
                    if self.service.is_recording() {
                        self.service.force_save().await;
                        self.service.refresh_disk_space();
                    }
                }

                notification = notifications.recv() => {
                    match notification {
                        Ok(RecordingNotification::DiskSpaceLow { available }) => {
                            warn!(available_bytes = available, "Low disk space notification");
                            println!("warning: low disk space ({} MiB free)", available / (1024 * 1024));
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Notifications dropped");
                        }
                        Err(RecvError::Closed) => {
                            error!("Notification channel closed");
                            break;
                        }
                    }
                }
            }
        }

        if self.service.is_recording() {
            info!("Saving active recording before exit");
            match self.service.stop_recording().await {
                Ok(recording) => println!("saved {}", recording.id),
                Err(e) => error!(error = %e, "Failed to save active recording on exit"),
            }
        }

        info!("Memo-Scribe shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle(&mut self, command: AppCommand) -> AppResult<()> {
        match command {
            AppCommand::Start { format } => {
                let format = format.unwrap_or(self.config.recording.default_format);
                self.service.start_recording(format).await?;
                println!("recording ({})", format);
            }
            AppCommand::Pause => {
                self.service.pause_recording()?;
                println!("paused at {}", self.service.formatted_current_duration());
            }
            AppCommand::Resume => {
                self.service.resume_recording()?;
                println!("recording");
            }
            AppCommand::Stop => {
                let recording = self.service.stop_recording().await?;
                println!(
                    "saved {} ({})",
                    recording.id,
                    format_duration(recording.duration)
                );
            }
            AppCommand::Save => {
                self.service.force_save().await;
                println!("checkpoint at {}", self.service.formatted_current_duration());
            }
            AppCommand::Status => self.print_status(),
            AppCommand::List => self.print_recordings().await?,
            AppCommand::Select { id } => {
                if let Some(id) = id {
                    self.service.recording(id).await?;
                }
                self.service.select_recording(id);
                println!("selected {}", display_selection(id));
            }
            AppCommand::Delete { id } => {
                self.service.delete_recording(id).await?;
                println!("deleted {}", id);
            }
            AppCommand::ExportAudio { id } => {
                let recording = self.service.recording(self.target(id)?).await?;
                let path = self.service.export_audio(&recording).await?;
                println!("audio written to {}", path.display());
            }
            AppCommand::ExportSubtitles { id, format } => {
                let recording = self.service.recording(self.target(id)?).await?;
                let mut options = self.config.export.subtitle;
                if let Some(format) = format {
                    options.format = format;
                }
                let path = self.service.export_subtitles(&recording, &options).await?;
                println!("subtitles written to {}", path.display());
            }
            AppCommand::Recover => self.recover_all().await,
            AppCommand::Discard => self.discard_all(),
            AppCommand::Help => println!("{}", HELP),
            AppCommand::Quit => {}
        }

        Ok(())
    }

    /// Explicit id, else the selected recording.
    #[track_caller]
    fn target(&self, id: Option<Uuid>) -> AppResult<Uuid> {
        id.or(self.service.selected_recording())
            .ok_or_else(|| AppError::CommandParse {
                input: String::new(),
                reason: "no recording id given and none selected".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn report_incomplete_recordings(&self) {
        let incomplete = self.service.check_for_incomplete_recordings();
        if incomplete.is_empty() {
            return;
        }

        println!(
            "{} incomplete recording(s) from a previous run; type 'recover' or 'discard'",
            incomplete.len()
        );
        for metadata in &incomplete {
            println!(
                "  {}  started {}  last checkpoint {}",
                metadata.id,
                metadata.start_time.format("%Y-%m-%d %H:%M:%S"),
                format_duration(metadata.duration)
            );
        }
    }

    async fn recover_all(&mut self) {
        let incomplete = self.service.check_for_incomplete_recordings();
        if incomplete.is_empty() {
            println!("nothing to recover");
            return;
        }

        for metadata in &incomplete {
            match self.service.recover_recording(metadata).await {
                Ok(recording) => println!(
                    "recovered {} ({})",
                    recording.id,
                    format_duration(recording.duration)
                ),
                Err(e) => {
                    error!(recording_id = %metadata.id, error = %e, "Recovery failed");
                    println!("could not recover {}: {}", metadata.id, e);
                }
            }
        }
    }

    fn discard_all(&mut self) {
        let incomplete = self.service.check_for_incomplete_recordings();
        if incomplete.is_empty() {
            println!("nothing to discard");
            return;
        }

        for metadata in &incomplete {
            match self.service.discard_recording(metadata) {
                Ok(()) => println!("discarded {}", metadata.id),
                Err(e) => {
                    error!(recording_id = %metadata.id, error = %e, "Discard failed");
                    println!("could not discard {}: {}", metadata.id, e);
                }
            }
        }
    }

    fn print_status(&self) {
        println!("state:     {}", self.service.state());
        println!("duration:  {}", self.service.formatted_current_duration());
        println!(
            "disk:      {}",
            if self.service.is_disk_space_low() {
                "low"
            } else {
                "ok"
            }
        );
        println!(
            "selected:  {}",
            display_selection(self.service.selected_recording())
        );
        if let Some(message) = self.service.error_message() {
            println!("last error: {}", message);
        }
    }

    async fn print_recordings(&self) -> AppResult<()> {
        let recordings = self.service.recordings().await?;
        if recordings.is_empty() {
            println!("no recordings");
            return Ok(());
        }

        let selected = self.service.selected_recording();
        for recording in &recordings {
            let marker = if Some(recording.id) == selected { '*' } else { ' ' };
            let transcript = if recording.session.is_some() {
                "transcript"
            } else {
                ""
            };
            println!(
                "{} {}  {}  {}  {}  {}",
                marker,
                recording.id,
                recording.title,
                format_duration(recording.duration),
                recording.format,
                transcript
            );
        }

        Ok(())
    }
}

fn display_selection(id: Option<Uuid>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}
