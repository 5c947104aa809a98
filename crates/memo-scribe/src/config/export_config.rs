use memo_scribe_core::SubtitleExportOptions;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Export configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory exported files are written to (None = data directory).
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    /// Options used by `export-subtitles`.
    #[serde(default)]
    pub subtitle: SubtitleExportOptions,
}
