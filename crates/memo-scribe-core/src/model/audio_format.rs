use crate::RecordingServiceError;

use std::{fmt, panic::Location, str::FromStr};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Audio container produced by a capture session.
///
/// The canonical file extension of each format equals its string tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-4 audio.
    #[default]
    M4a,
    /// Uncompressed PCM WAVE.
    Wav,
    /// MPEG-1 Layer III.
    Mp3,
}

impl AudioFormat {
    /// Every supported format.
    pub const ALL: [AudioFormat; 3] = [AudioFormat::M4a, AudioFormat::Wav, AudioFormat::Mp3];

    /// String tag of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::M4a => "m4a",
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }

    /// File extension (without the dot).
    pub fn file_extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = RecordingServiceError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == tag)
            .ok_or_else(|| RecordingServiceError::FormatNotSupported {
                format: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
