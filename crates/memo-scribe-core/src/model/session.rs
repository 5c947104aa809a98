use crate::model::Segment;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered transcript of one recording.
///
/// Segment order is insertion order and is significant: exports render cues in
/// exactly this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session id.
    pub id: Uuid,
    /// When transcription of this session began.
    pub created_at: DateTime<Utc>,
    /// Language tag of `Segment::original_text`.
    #[serde(default)]
    pub source_language: Option<String>,
    /// Language tag of `Segment::translated_text`.
    #[serde(default)]
    pub target_language: Option<String>,
    /// Owning recording, if the session has been attached to one.
    #[serde(default)]
    pub recording_id: Option<Uuid>,
    segments: Vec<Segment>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source_language: None,
            target_language: None,
            recording_id: None,
            segments: Vec::new(),
        }
    }

    /// Creates a session holding `segments` in the given order.
    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            ..Self::new()
        }
    }

    /// Appends a segment after every existing one.
    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Segments in insertion order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the session holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End time of the latest-ending segment, or 0.
    pub fn duration(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.end_time)
            .fold(0.0, f64::max)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
