use crate::{ConversationMessage, ExportResult, Segment, SubtitleExportOptions};

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Renders transcripts to subtitle documents and writes them to disk.
#[async_trait]
pub trait SubtitleExporter: Send + Sync {
    /// Renders `segments` and writes the document to a new file whose
    /// extension matches `options.format`.
    async fn export(
        &self,
        segments: &[Segment],
        options: &SubtitleExportOptions,
    ) -> ExportResult<PathBuf>;

    /// Renders `messages`, anchored at `session_start`, and writes the document
    /// to a new file.
    async fn export_messages(
        &self,
        messages: &[ConversationMessage],
        session_start: DateTime<Utc>,
        options: &SubtitleExportOptions,
    ) -> ExportResult<PathBuf>;

    /// Renders `segments` without writing anything.
    fn generate_content(&self, segments: &[Segment], options: &SubtitleExportOptions) -> String;

    /// Renders `messages`, anchored at `session_start`, without writing anything.
    fn generate_content_from_messages(
        &self,
        messages: &[ConversationMessage],
        session_start: DateTime<Utc>,
        options: &SubtitleExportOptions,
    ) -> String;
}
