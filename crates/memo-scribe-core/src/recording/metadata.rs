use crate::AudioFormat;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Describes one in-flight or crash-orphaned capture.
///
/// Plain value: mutation goes through the consuming `with_*` / `checkpointed`
/// / `completed` methods, which return the updated copy for the owner to
/// reassign. Serializable so the device layer can persist it as a recovery
/// sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    /// Unique capture id.
    pub id: Uuid,
    /// When capture began.
    pub start_time: DateTime<Utc>,
    /// Seconds captured as of the last checkpoint.
    pub duration: f64,
    /// Requested container format.
    pub format: AudioFormat,
    /// Location of the in-progress file; absent until the device creates one.
    #[serde(default)]
    pub temp_file: Option<PathBuf>,
    /// Set once the device reports a clean stop.
    #[serde(default)]
    pub is_complete: bool,
    /// Time of the last successful checkpoint.
    #[serde(default)]
    pub last_auto_save_time: Option<DateTime<Utc>>,
}

impl RecordingMetadata {
    /// Metadata for a capture starting now.
    pub fn new(format: AudioFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: Utc::now(),
            duration: 0.0,
            format,
            temp_file: None,
            is_complete: false,
            last_auto_save_time: None,
        }
    }

    /// Returns a copy pointing at `path`.
    pub fn with_temp_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_file = Some(path.into());
        self
    }

    /// Returns a copy advanced to a checkpoint taken at `at`.
    pub fn checkpointed(mut self, duration: f64, at: DateTime<Utc>) -> Self {
        self.duration = duration;
        self.last_auto_save_time = Some(at);
        self
    }

    /// Returns a copy marked complete with its final file and duration.
    pub fn completed(mut self, file: impl Into<PathBuf>, duration: f64) -> Self {
        self.temp_file = Some(file.into());
        self.duration = duration;
        self.is_complete = true;
        self
    }

    /// The in-progress file location, if any.
    pub fn temp_file(&self) -> Option<&Path> {
        self.temp_file.as_deref()
    }
}
