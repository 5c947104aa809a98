use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One utterance of a live conversation, before it is materialized into a
/// [`Session`](crate::Session).
///
/// Carries an absolute timestamp; subtitle rendering anchors it against an
/// explicit session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message id.
    pub id: Uuid,
    /// When the utterance began.
    pub timestamp: DateTime<Utc>,
    /// Spoken length in seconds; 0 when unknown.
    #[serde(default)]
    pub duration: f64,
    /// Transcribed text.
    pub original_text: String,
    /// Translation, when one exists.
    #[serde(default)]
    pub translated_text: Option<String>,
}

impl ConversationMessage {
    /// Creates a message with unknown duration.
    pub fn new(
        timestamp: DateTime<Utc>,
        original_text: impl Into<String>,
        translated_text: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            duration: 0.0,
            original_text: original_text.into(),
            translated_text,
        }
    }

    /// Sets the spoken duration.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}
