use memo_scribe_core::{RecordResult, RecordStore, Recording, RecordingError};

use std::{
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Recording library on disk.
///
/// Each recording is a `<id>.json` row plus its audio bytes in
/// `<id>.<format extension>`. Rows are written with a temp file and rename so
/// a crash never leaves a half-written row.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the library.
    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn row_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn audio_path(&self, recording: &Recording) -> PathBuf {
        self.dir
            .join(format!("{}.{}", recording.id, recording.format.file_extension()))
    }

    async fn read_row(&self, path: &Path) -> RecordResult<Option<Recording>> {
        let json = match tokio::fs::read(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage(e)),
        };

        serde_json::from_slice(&json).map(Some).map_err(storage)
    }

    async fn write_row(&self, recording: &Recording) -> RecordResult<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(storage)?;

        let json = serde_json::to_vec_pretty(recording).map_err(storage)?;
        let path = self.row_path(recording.id);
        let temp_path = path.with_extension("json.tmp");

        tokio::fs::write(&temp_path, json).await.map_err(storage)?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(storage)?;

        Ok(())
    }

    async fn write_audio(&self, recording: &Recording) -> RecordResult<()> {
        if let Some(audio_data) = &recording.audio_data {
            tokio::fs::create_dir_all(&self.dir).await.map_err(storage)?;
            tokio::fs::write(self.audio_path(recording), audio_data)
                .await
                .map_err(storage)?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    #[instrument(skip(self, recording), fields(recording_id = %recording.id))]
    async fn create(&mut self, recording: Recording) -> RecordResult<()> {
        // Audio first: a row never points at missing bytes.
        self.write_audio(&recording).await?;
        self.write_row(&recording).await?;

        debug!("Recording row created");

        Ok(())
    }

    /// Loads the row and its audio bytes.
    async fn fetch(&self, id: Uuid) -> RecordResult<Option<Recording>> {
        let Some(mut recording) = self.read_row(&self.row_path(id)).await? else {
            return Ok(None);
        };

        match tokio::fs::read(self.audio_path(&recording)).await {
            Ok(bytes) => recording.audio_data = Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(storage(e)),
        }

        Ok(Some(recording))
    }

    /// Rows only, newest first. Audio bytes load through `fetch`.
    async fn fetch_all(&self) -> RecordResult<Vec<Recording>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage(e)),
        };

        let mut recordings = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(storage)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match self.read_row(&path).await {
                Ok(Some(recording)) => recordings.push(recording),
                Ok(None) => {}
                Err(e) => warn!(path = ?path, error = %e, "Skipping unreadable recording row"),
            }
        }

        recordings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(recordings)
    }

    #[instrument(skip(self, recording), fields(recording_id = %recording.id))]
    async fn update(&mut self, recording: Recording) -> RecordResult<()> {
        if !tokio::fs::try_exists(self.row_path(recording.id))
            .await
            .map_err(storage)?
        {
            return Err(RecordingError::NotFound {
                id: recording.id,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.write_audio(&recording).await?;
        self.write_row(&recording).await
    }

    #[instrument(skip(self))]
    async fn delete(&mut self, id: Uuid) -> RecordResult<()> {
        let Some(recording) = self.read_row(&self.row_path(id)).await? else {
            return Err(RecordingError::NotFound {
                id,
                location: ErrorLocation::from(Location::caller()),
            });
        };

        tokio::fs::remove_file(self.row_path(id))
            .await
            .map_err(storage)?;

        if let Err(e) = tokio::fs::remove_file(self.audio_path(&recording)).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(recording_id = %id, error = %e, "Row deleted, audio file remains");
            }
        }

        debug!("Recording deleted");

        Ok(())
    }
}

#[track_caller]
fn storage(e: impl std::error::Error + Send + Sync + 'static) -> RecordingError {
    RecordingError::Storage {
        source: Box::new(e),
        location: ErrorLocation::from(Location::caller()),
    }
}
