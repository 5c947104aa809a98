//! Memo-scribe Core Library
//!
//! Recording lifecycle control with crash recovery, and subtitle rendering for
//! bilingual transcripts.
//!
//! # Architecture
//!
//! ```text
//! caller ──► RecordingService ──► RecordingController ──► CaptureDevice
//!                 │                                        (external)
//!                 ├──► RecordStore (external)
//!                 └──► SubtitleExporter ──► SubtitleExportEngine
//! ```
//!
//! # Example
//!
//! ```no_run
//! use memo_scribe_core::{Segment, SubtitleExportEngine, SubtitleExportOptions, SubtitleFormat};
//!
//! let segments = vec![Segment::new(0.0, 5.0, "Hello", Some("Bonjour".to_string()))];
//! let options = SubtitleExportOptions::with_format(SubtitleFormat::Vtt);
//!
//! let document = SubtitleExportEngine::render_segments(&segments, &options);
//! assert!(document.starts_with("WEBVTT"));
//! ```

mod error;
mod model;
mod recording;
mod service;
mod subtitle;

pub use {
    error::{
        BoxedSource, ExportResult, RecordResult, RecordingError, RecordingServiceError,
        ServiceResult, SubtitleExportError,
    },
    model::{AudioFormat, ConversationMessage, Recording, Segment, Session},
    recording::{
        CaptureDevice, CaptureOutput, DISK_SPACE_LOW_NOTIFICATION, LOW_DISK_SPACE_THRESHOLD,
        RecordingController, RecordingMetadata, RecordingNotification, RecordingState,
        format_duration,
    },
    service::{InMemoryRecordStore, RecordStore, RecordingService},
    subtitle::{
        BilingualOrder, ContentOption, SubtitleExportEngine, SubtitleExportOptions,
        SubtitleExporter, SubtitleFormat,
    },
};
