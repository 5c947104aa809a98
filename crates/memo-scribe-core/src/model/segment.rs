use serde::{Deserialize, Serialize};

/// A timed unit of original and (optionally) translated text.
///
/// Times are seconds from the start of the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Cue start, in seconds.
    pub start_time: f64,
    /// Cue end, in seconds. Greater than `start_time`.
    pub end_time: f64,
    /// Transcribed source-language text.
    pub original_text: String,
    /// Translation of `original_text`, when one exists.
    #[serde(default)]
    pub translated_text: Option<String>,
}

impl Segment {
    /// Creates a segment.
    pub fn new(
        start_time: f64,
        end_time: f64,
        original_text: impl Into<String>,
        translated_text: Option<String>,
    ) -> Self {
        Self {
            start_time,
            end_time,
            original_text: original_text.into(),
            translated_text,
        }
    }

    /// Length of the segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// True when both times are finite, non-negative, and `start < end`.
    pub fn has_valid_timing(&self) -> bool {
        self.start_time.is_finite()
            && self.end_time.is_finite()
            && self.start_time >= 0.0
            && self.start_time < self.end_time
    }
}
