use std::sync::atomic::{AtomicBool, Ordering};

/// RAII guard that holds an "is exporting" flag raised.
///
/// The flag is lowered on drop, so it falls back to `false` on every exit
/// path: success, error return, or the export future being dropped.
pub(crate) struct ExportGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ExportGuard<'a> {
    /// Raise `flag` and return a guard that lowers it on drop.
    pub(crate) fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag }
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
