use crate::{RecordResult, RecordStore, Recording, RecordingError};

use std::{collections::HashMap, panic::Location};

use async_trait::async_trait;
use error_location::ErrorLocation;
use uuid::Uuid;

/// Process-local [`RecordStore`].
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    recordings: HashMap<Uuid, Recording>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored recordings.
    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&mut self, recording: Recording) -> RecordResult<()> {
        self.recordings.insert(recording.id, recording);
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> RecordResult<Option<Recording>> {
        Ok(self.recordings.get(&id).cloned())
    }

    async fn fetch_all(&self) -> RecordResult<Vec<Recording>> {
        let mut recordings: Vec<Recording> = self.recordings.values().cloned().collect();
        recordings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recordings)
    }

    async fn update(&mut self, recording: Recording) -> RecordResult<()> {
        match self.recordings.get_mut(&recording.id) {
            Some(existing) => {
                *existing = recording;
                Ok(())
            }
            None => Err(RecordingError::NotFound {
                id: recording.id,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    async fn delete(&mut self, id: Uuid) -> RecordResult<()> {
        self.recordings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RecordingError::NotFound {
                id,
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
