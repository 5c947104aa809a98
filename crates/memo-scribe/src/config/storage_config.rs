use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Recording library configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding saved recordings (None = data directory).
    #[serde(default)]
    pub library_dir: Option<PathBuf>,
}
