use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Cooperative cancellation, threaded through every public operation (spec
/// §5). Cloning shares the same underlying flag — the style mirrors the
/// `Arc<AtomicBool>` flags `OverlayFs` uses for `writeback`/
/// `announce_submounts`, generalized into a standalone handle instead of a
/// private struct field.
///
/// Cancelling does not interrupt an in-flight operation; it only causes
/// subsequent [`CancellationToken::check`] calls to fail with
/// [`Error::Cancelled`]. Long operations (recursive delete, large truncate)
/// check between sub-steps.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Cancelled`] if cancellation has been requested.
    /// Called at the start of every backend operation, and between
    /// sub-steps of recursive delete / large truncate.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
