use crate::model::{AudioFormat, Session};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finished recording as held by the record store.
///
/// `audio_data` is not serialized; stores keep the bytes next to the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Unique recording id.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Finalized audio bytes, absent until the file has been persisted.
    #[serde(skip)]
    pub audio_data: Option<Vec<u8>>,
    /// Length in seconds.
    pub duration: f64,
    /// Container format of `audio_data`.
    pub format: AudioFormat,
    /// When capture began.
    pub created_at: DateTime<Utc>,
    /// Transcript, once one has been attached.
    #[serde(default)]
    pub session: Option<Session>,
}

impl Recording {
    /// Creates a recording titled after its creation time.
    pub fn new(
        id: Uuid,
        created_at: DateTime<Utc>,
        duration: f64,
        format: AudioFormat,
        audio_data: Option<Vec<u8>>,
    ) -> Self {
        Self {
            id,
            title: format!("Recording {}", created_at.format("%Y-%m-%d %H:%M:%S")),
            audio_data,
            duration,
            format,
            created_at,
            session: None,
        }
    }

    /// Attaches `session`, pointing its back-reference at this recording.
    pub fn attach_session(&mut self, mut session: Session) {
        session.recording_id = Some(self.id);
        self.session = Some(session);
    }

    /// True when the recording has stored audio bytes.
    pub fn has_audio(&self) -> bool {
        self.audio_data.is_some()
    }
}
