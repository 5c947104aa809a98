//! Deterministic subtitle rendering.
//!
//! Cues render in input order. A bilingual SRT cue with the default options:
//!
//! ```text
//! 1
//! 00:00:00,000 --> 00:00:05,000
//! Bonjour
//! Hello
//! ```
//!
//! WebVTT prefixes the document with `WEBVTT` and a blank line, drops cue
//! numbers, and uses `.` before the milliseconds. Plain text keeps only the
//! text lines.

use crate::{
    BilingualOrder, ContentOption, ConversationMessage, ExportResult, Segment,
    SubtitleExportError, SubtitleExportOptions, SubtitleExporter, SubtitleFormat,
    subtitle::format_timestamp,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Cue length given to a message with no duration and no later neighbour.
const DEFAULT_MESSAGE_DURATION_SECS: f64 = 3.0;

const FILE_PREFIX: &str = "subtitles-";

/// A renderable cue borrowed from a segment or message.
struct Cue<'a> {
    start: f64,
    end: f64,
    original: &'a str,
    translated: Option<&'a str>,
}

impl<'a> Cue<'a> {
    fn from_segment(segment: &'a Segment) -> Self {
        Self {
            start: segment.start_time,
            end: segment.end_time,
            original: &segment.original_text,
            translated: segment.translated_text.as_deref(),
        }
    }
}

/// Renders segments and conversation messages to SRT, WebVTT, or plain text.
///
/// Rendering is pure. [`SubtitleExporter::export`] additionally writes the
/// document to a new file under the engine's output directory.
#[derive(Debug, Clone)]
pub struct SubtitleExportEngine {
    output_dir: PathBuf,
}

impl SubtitleExportEngine {
    /// Engine writing into the system temp directory.
    pub fn new() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
        }
    }

    /// Engine writing into `output_dir`.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory exported files are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders `segments` in order. Empty input renders an empty document.
    pub fn render_segments(segments: &[Segment], options: &SubtitleExportOptions) -> String {
        let cues: Vec<Cue<'_>> = segments.iter().map(Cue::from_segment).collect();
        render(&cues, options)
    }

    /// Renders `messages` with timestamps relative to `session_start`.
    ///
    /// A message starts at its offset from `session_start` (clamped at 0) and
    /// ends after its duration; a message without a duration ends where the
    /// next message starts, or three seconds later.
    pub fn render_messages(
        messages: &[ConversationMessage],
        session_start: DateTime<Utc>,
        options: &SubtitleExportOptions,
    ) -> String {
        let starts: Vec<f64> = messages
            .iter()
            .map(|m| offset_secs(m.timestamp, session_start))
            .collect();

        let cues: Vec<Cue<'_>> = messages
            .iter()
            .zip(&starts)
            .enumerate()
            .map(|(i, (message, &start))| {
                let end = if message.duration > 0.0 {
                    start + message.duration
                } else {
                    match starts.get(i + 1) {
                        Some(&next) if next > start => next,
                        _ => start + DEFAULT_MESSAGE_DURATION_SECS,
                    }
                };

                Cue {
                    start,
                    end,
                    original: &message.original_text,
                    translated: message.translated_text.as_deref(),
                }
            })
            .collect();

        render(&cues, options)
    }

    #[instrument(skip(self, content))]
    async fn write_document(&self, content: &str, format: SubtitleFormat) -> ExportResult<PathBuf> {
        if content.trim().is_empty() {
            return Err(SubtitleExportError::EmptyContent {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| SubtitleExportError::WriteError {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let suffix = format!(".{}", format.file_extension());
        let (_, path) = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.output_dir)
            .map_err(|e| SubtitleExportError::WriteError {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .keep()
            .map_err(|e| SubtitleExportError::WriteError {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| SubtitleExportError::WriteError {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(path = ?path, bytes = content.len(), "Subtitle file written");

        Ok(path)
    }
}

impl Default for SubtitleExportEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubtitleExporter for SubtitleExportEngine {
    #[instrument(skip(self, segments), fields(segment_count = segments.len()))]
    async fn export(
        &self,
        segments: &[Segment],
        options: &SubtitleExportOptions,
    ) -> ExportResult<PathBuf> {
        if segments.is_empty() {
            return Err(SubtitleExportError::NoSegments {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let content = Self::render_segments(segments, options);
        self.write_document(&content, options.format).await
    }

    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    async fn export_messages(
        &self,
        messages: &[ConversationMessage],
        session_start: DateTime<Utc>,
        options: &SubtitleExportOptions,
    ) -> ExportResult<PathBuf> {
        if messages.is_empty() {
            return Err(SubtitleExportError::NoMessages {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let content = Self::render_messages(messages, session_start, options);
        self.write_document(&content, options.format).await
    }

    fn generate_content(&self, segments: &[Segment], options: &SubtitleExportOptions) -> String {
        Self::render_segments(segments, options)
    }

    fn generate_content_from_messages(
        &self,
        messages: &[ConversationMessage],
        session_start: DateTime<Utc>,
        options: &SubtitleExportOptions,
    ) -> String {
        Self::render_messages(messages, session_start, options)
    }
}

fn render(cues: &[Cue<'_>], options: &SubtitleExportOptions) -> String {
    let blocks: Vec<String> = cues
        .iter()
        .enumerate()
        .map(|(i, cue)| render_cue(i + 1, cue, options))
        .filter(|block| !block.is_empty())
        .collect();

    if blocks.is_empty() {
        return String::new();
    }

    let mut document = String::new();
    if options.format == SubtitleFormat::Vtt {
        document.push_str("WEBVTT\n\n");
    }
    document.push_str(&blocks.join("\n\n"));
    document.push('\n');

    debug!(
        cue_count = blocks.len(),
        format = %options.format,
        bytes = document.len(),
        "Subtitle document rendered"
    );

    document
}

fn render_cue(number: usize, cue: &Cue<'_>, options: &SubtitleExportOptions) -> String {
    let mut lines: Vec<String> = Vec::new();

    match options.format {
        SubtitleFormat::Srt => {
            lines.push(number.to_string());
            if options.include_timestamps {
                lines.push(timing_line(cue, ','));
            }
        }
        SubtitleFormat::Vtt => {
            if options.include_timestamps {
                lines.push(timing_line(cue, '.'));
            }
        }
        SubtitleFormat::Txt => {}
    }

    lines.extend(cue_text(cue, options).into_iter().map(str::to_string));
    lines.join("\n")
}

fn timing_line(cue: &Cue<'_>, separator: char) -> String {
    format!(
        "{} --> {}",
        format_timestamp(cue.start, separator),
        format_timestamp(cue.end, separator)
    )
}

/// Text lines of a cue. Blank lines are dropped so a cue body never contains
/// the blank line that terminates it.
fn cue_text<'a>(cue: &Cue<'a>, options: &SubtitleExportOptions) -> Vec<&'a str> {
    let original = cue.original;
    let translated = cue.translated.unwrap_or("");

    let texts = match options.content_option {
        ContentOption::OriginalOnly => vec![original],
        ContentOption::TranslationOnly => vec![translated],
        ContentOption::Both => match options.bilingual_order {
            BilingualOrder::OriginalFirst => vec![original, translated],
            BilingualOrder::TranslationFirst => vec![translated, original],
        },
    };

    texts
        .into_iter()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn offset_secs(timestamp: DateTime<Utc>, session_start: DateTime<Utc>) -> f64 {
    let millis = (timestamp - session_start).num_milliseconds().max(0);
    millis as f64 / 1000.0
}
