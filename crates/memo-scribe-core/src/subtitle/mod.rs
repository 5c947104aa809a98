mod engine;
mod exporter;
mod options;
mod timestamp;

pub use {
    engine::SubtitleExportEngine,
    exporter::SubtitleExporter,
    options::{BilingualOrder, ContentOption, SubtitleExportOptions, SubtitleFormat},
};

pub(crate) use timestamp::format_timestamp;
