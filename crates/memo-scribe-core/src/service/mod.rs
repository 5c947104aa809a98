mod export_guard;
mod memory_store;
mod record_store;
mod recording_service;

pub(crate) use export_guard::ExportGuard;

pub use {
    memory_store::InMemoryRecordStore, record_store::RecordStore,
    recording_service::RecordingService,
};
