use crate::SubtitleExportError;

use std::{fmt, panic::Location, str::FromStr};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Subtitle document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip: numbered cues, comma millisecond separator.
    #[default]
    Srt,
    /// WebVTT: `WEBVTT` header, dot millisecond separator.
    Vtt,
    /// Plain text blocks without timestamps.
    Txt,
}

impl SubtitleFormat {
    /// Every supported format.
    pub const ALL: [SubtitleFormat; 3] = [SubtitleFormat::Srt, SubtitleFormat::Vtt, SubtitleFormat::Txt];

    /// Canonical file extension (without the dot).
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleExportError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.file_extension() == tag)
            .ok_or_else(|| SubtitleExportError::InvalidFormat {
                format: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Which text of each segment is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentOption {
    /// Source-language text only.
    OriginalOnly,
    /// Translation only; a missing translation renders empty.
    TranslationOnly,
    /// Both texts, ordered by [`BilingualOrder`].
    #[default]
    Both,
}

/// Line order of bilingual cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BilingualOrder {
    /// Original line, then translation.
    OriginalFirst,
    /// Translation line, then original.
    #[default]
    TranslationFirst,
}

/// Rendering options for subtitle export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleExportOptions {
    /// Document format.
    #[serde(default)]
    pub format: SubtitleFormat,
    /// Which texts to render.
    #[serde(default)]
    pub content_option: ContentOption,
    /// Emit cue timestamp lines (ignored for `txt`).
    #[serde(default = "default_include_timestamps")]
    pub include_timestamps: bool,
    /// Line order when rendering both texts.
    #[serde(default)]
    pub bilingual_order: BilingualOrder,
}

impl SubtitleExportOptions {
    /// Default options with `format`.
    pub fn with_format(format: SubtitleFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

impl Default for SubtitleExportOptions {
    fn default() -> Self {
        Self {
            format: SubtitleFormat::Srt,
            content_option: ContentOption::Both,
            include_timestamps: default_include_timestamps(),
            bilingual_order: BilingualOrder::TranslationFirst,
        }
    }
}

fn default_include_timestamps() -> bool {
    true
}
