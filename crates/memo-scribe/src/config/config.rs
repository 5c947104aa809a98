//! Configuration management for memo-scribe.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{ExportConfig, RecordingConfig, StorageConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Capture session settings.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
    /// Recording library settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating the
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate configuration from `path`.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Reject values the recorder cannot run with.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        if self.recording.auto_save_interval_secs == 0 {
            return Err(AppError::ConfigError {
                reason: "recording.auto_save_interval_secs must be at least 1".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.recording.default_format != memo_scribe_core::AudioFormat::Wav {
            warn!(
                format = %self.recording.default_format,
                "Default format is not produced by the microphone device; pass a format to start"
            );
        }

        Ok(())
    }

    /// Save configuration to the platform config directory.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Directory for in-progress captures and their recovery sidecars.
    #[track_caller]
    pub fn recordings_dir(&self) -> AppResult<PathBuf> {
        resolve_dir(self.recording.recordings_dir.as_deref(), "recordings")
    }

    /// Directory holding the saved recording library.
    #[track_caller]
    pub fn library_dir(&self) -> AppResult<PathBuf> {
        resolve_dir(self.storage.library_dir.as_deref(), "library")
    }

    /// Directory exported audio and subtitle files are written to.
    #[track_caller]
    pub fn export_dir(&self) -> AppResult<PathBuf> {
        resolve_dir(self.export.export_dir.as_deref(), "exports")
    }

    /// Directory for rolling log files. Created if missing.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        let log_dir = project_dirs()?.data_dir().join("logs");
        fs::create_dir_all(&log_dir)?;
        Ok(log_dir)
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}

#[track_caller]
fn project_dirs() -> AppResult<ProjectDirs> {
    ProjectDirs::from("com", "memo-scribe", "Memo-Scribe").ok_or_else(|| AppError::ConfigError {
        reason: "Failed to get project directories".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn resolve_dir(configured: Option<&Path>, default_name: &str) -> AppResult<PathBuf> {
    match configured {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(project_dirs()?.data_dir().join(default_name)),
    }
}
