//! JSON recovery sidecars.
//!
//! Each in-progress capture `<id>.wav` has `<id>.metadata.json` beside it
//! holding its [`RecordingMetadata`]. A sidecar outliving its process marks an
//! incomplete recording.

use crate::AppResult;

use memo_scribe_core::RecordingMetadata;

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

const SIDECAR_SUFFIX: &str = ".metadata.json";

/// Location of the sidecar for the capture file `recording_path`.
pub(crate) fn sidecar_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("metadata.json")
}

/// Writes `metadata` beside `recording_path`, replacing any previous sidecar.
#[track_caller]
pub(crate) fn write(metadata: &RecordingMetadata, recording_path: &Path) -> AppResult<()> {
    let path = sidecar_path(recording_path);
    let json = serde_json::to_string_pretty(metadata)?;

    let temp_path = path.with_extension("json.tmp");
    let mut temp_file = fs::File::create(&temp_path)?;
    temp_file.write_all(json.as_bytes())?;
    temp_file.sync_all()?;
    fs::rename(&temp_path, &path)?;

    debug!(path = ?path, recording_id = %metadata.id, "Sidecar written");

    Ok(())
}

/// Removes the sidecar beside `recording_path`. Succeeds if there is none.
#[track_caller]
pub(crate) fn remove(recording_path: &Path) -> AppResult<()> {
    match fs::remove_file(sidecar_path(recording_path)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Every readable sidecar in `dir`. Unreadable sidecars are skipped.
pub(crate) fn scan(dir: &Path) -> Vec<RecordingMetadata> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(dir = ?dir, error = %e, "Failed to scan for sidecars");
            return Vec::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(SIDECAR_SUFFIX))
        })
        .filter_map(|path| match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<RecordingMetadata>(&json) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    warn!(path = ?path, error = %e, "Skipping unparseable sidecar");
                    None
                }
            },
            Err(e) => {
                warn!(path = ?path, error = %e, "Skipping unreadable sidecar");
                None
            }
        })
        .collect()
}
