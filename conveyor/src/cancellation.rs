//! Cooperative cancellation handle.

use crate::errors::{ConveyorError, ConveyorResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Caller-owned cancellation signal.
///
/// Clones share the same flag. Executors only observe it at item and block
/// boundaries, so a running block body is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!("Cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(ConveyorError::Canceled)` once cancellation was requested.
    pub fn check(&self) -> ConveyorResult<()> {
        if self.is_cancelled() {
            Err(ConveyorError::Canceled)
        } else {
            Ok(())
        }
    }
}
