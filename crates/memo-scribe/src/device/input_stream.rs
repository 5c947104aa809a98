use crate::{AppError, AppResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::JoinHandle,
};

use cpal::{
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

/// Maximum samples buffered between checkpoints (5 minutes of 48kHz stereo).
///
/// The auto-save interval drains the buffer long before this is reached;
/// the cap only bounds memory if checkpoints stop running.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 2 * 60 * 5;

enum StreamCommand {
    Play,
    Pause,
    Stop,
}

/// Sample layout reported by the opened input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Default microphone input running on its own thread.
///
/// `cpal::Stream` is not `Send` on every platform, so the stream is built,
/// driven, and dropped on a dedicated thread. This handle is `Send` and talks
/// to it through a command channel; captured samples arrive through a shared
/// buffer.
pub(crate) struct InputStream {
    commands: mpsc::Sender<StreamCommand>,
    thread: Option<JoinHandle<()>>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Set while paused. The callback drops samples immediately, without
    /// waiting for the stream thread to act on the pause command.
    paused: Arc<AtomicBool>,
    /// Set before the stream is dropped so no in-flight callback writes.
    shutdown: Arc<AtomicBool>,
    format: StreamFormat,
}

impl InputStream {
    /// Opens the default input device and starts capturing.
    #[instrument]
    pub(crate) async fn open() -> AppResult<Self> {
        let samples = Arc::new(Mutex::new(VecDeque::new()));
        let paused = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));

        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread = {
            let samples = Arc::clone(&samples);
            let paused = Arc::clone(&paused);
            let shutdown = Arc::clone(&shutdown);
            std::thread::Builder::new()
                .name("memo-scribe-input".to_string())
                .spawn(move || run_stream(samples, paused, shutdown, ready_tx, command_rx))?
        };

        let format = match ready_rx.await {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(AppError::DeviceError {
                    reason: "Input thread exited before the stream opened".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(Self {
            commands: command_tx,
            thread: Some(thread),
            samples,
            paused,
            shutdown,
            format,
        })
    }

    /// Layout of the captured samples.
    pub(crate) fn format(&self) -> StreamFormat {
        self.format
    }

    /// Stops delivering samples until [`resume`](Self::resume).
    #[track_caller]
    pub(crate) fn pause(&self) -> AppResult<()> {
        self.paused.store(true, Ordering::Release);
        self.send(StreamCommand::Pause)
    }

    /// Resumes delivering samples.
    #[track_caller]
    pub(crate) fn resume(&self) -> AppResult<()> {
        self.paused.store(false, Ordering::Release);
        self.send(StreamCommand::Play)
    }

    /// Takes every sample captured since the last drain.
    pub(crate) fn drain(&self) -> Vec<f32> {
        let mut buf = self.samples.lock().unwrap_or_else(|e| {
            error!("Sample buffer lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        buf.drain(..).collect()
    }

    /// Stops the stream, joins its thread, and returns the remaining samples.
    ///
    /// Blocks until the stream thread exits.
    pub(crate) fn close(mut self) -> Vec<f32> {
        // Signal the callback BEFORE the stream is dropped on its thread.
        self.shutdown.store(true, Ordering::Release);
        let _ = self.commands.send(StreamCommand::Stop);

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Input stream thread panicked");
            }
        }

        let remaining = self.drain();
        debug!(sample_count = remaining.len(), "Input stream closed");
        remaining
    }

    #[track_caller]
    fn send(&self, command: StreamCommand) -> AppResult<()> {
        self.commands
            .send(command)
            .map_err(|_| AppError::DeviceError {
                reason: "Input stream thread has stopped".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl Drop for InputStream {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        let _ = self.commands.send(StreamCommand::Stop);
    }
}

fn run_stream(
    samples: Arc<Mutex<VecDeque<f32>>>,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    ready_tx: oneshot::Sender<AppResult<StreamFormat>>,
    commands: mpsc::Receiver<StreamCommand>,
) {
    let (stream, format) = match build_stream(samples, paused, shutdown) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if ready_tx.send(Ok(format)).is_err() {
        return;
    }

    while let Ok(command) = commands.recv() {
        match command {
            StreamCommand::Play => {
                if let Err(e) = stream.play() {
                    warn!(error = %e, "Failed to resume input stream");
                }
            }
            StreamCommand::Pause => {
                if let Err(e) = stream.pause() {
                    warn!(error = %e, "Failed to pause input stream, samples are dropped instead");
                }
            }
            StreamCommand::Stop => break,
        }
    }

    drop(stream);
    info!("Audio capture stopped");
}

#[track_caller]
fn build_stream(
    samples: Arc<Mutex<VecDeque<f32>>>,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
) -> AppResult<(Stream, StreamFormat)> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| AppError::DeviceError {
            reason: "No microphone found".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let supported = device
        .default_input_config()
        .map_err(|e| device_failure("Failed to get config", e))?;

    let config: StreamConfig = supported.into();
    let format = StreamFormat {
        sample_rate: config.sample_rate,
        channels: config.channels,
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if shutdown.load(Ordering::Acquire) || paused.load(Ordering::Acquire) {
                    return;
                }
                let mut buf = samples.lock().unwrap_or_else(|e| {
                    error!("Sample buffer lock poisoned, recovering: {}", e);
                    e.into_inner()
                });
                buf.extend(data.iter().copied());
                while buf.len() > MAX_BUFFER_SAMPLES {
                    buf.pop_front();
                }
            },
            |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| device_failure("Failed to build stream", e))?;

    stream
        .play()
        .map_err(|e| device_failure("Failed to start stream", e))?;

    info!(
        device_id = ?device.id(),
        sample_rate = format.sample_rate,
        channels = format.channels,
        "Audio capture started"
    );

    Ok((stream, format))
}

/// Platform messages that mean the microphone is blocked by privacy settings.
const PERMISSION_MARKERS: [&str; 4] = [
    "permission",
    "access denied",
    "not authorized",
    "unauthorized",
];

/// Classifies a cpal failure. Backend messages that report a refused
/// microphone become `PermissionDenied`; everything else is a device error.
#[track_caller]
pub(crate) fn device_failure(context: &str, err: impl std::fmt::Display) -> AppError {
    let message = err.to_string();
    let lowered = message.to_ascii_lowercase();

    if PERMISSION_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return AppError::PermissionDenied {
            reason: message,
            location: ErrorLocation::from(Location::caller()),
        };
    }

    AppError::DeviceError {
        reason: format!("{}: {}", context, message),
        location: ErrorLocation::from(Location::caller()),
    }
}
