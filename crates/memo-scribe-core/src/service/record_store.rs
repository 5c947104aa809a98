use crate::{RecordResult, Recording};

use async_trait::async_trait;
use uuid::Uuid;

/// Persistent store of finished recordings.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a new recording.
    async fn create(&mut self, recording: Recording) -> RecordResult<()>;

    /// Looks up one recording, audio bytes included.
    async fn fetch(&self, id: Uuid) -> RecordResult<Option<Recording>>;

    /// Every recording, newest `created_at` first.
    async fn fetch_all(&self) -> RecordResult<Vec<Recording>>;

    /// Replaces an existing recording.
    ///
    /// Fails with `NotFound` when no recording has this id.
    async fn update(&mut self, recording: Recording) -> RecordResult<()>;

    /// Removes a recording.
    ///
    /// Fails with `NotFound` when no recording has this id.
    async fn delete(&mut self, id: Uuid) -> RecordResult<()>;
}
