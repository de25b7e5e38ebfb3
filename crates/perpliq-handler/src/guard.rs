//! Exclusion guard for handler entry points.
//!
//! One guard per handler instance. [`ExclusionGuard::enter`] fails while a
//! guarded call is in progress, whether the second caller is another
//! thread or a strategy calling back into the handler. The returned token
//! releases the guard when dropped, so every exit path (including `?`
//! propagation) releases it exactly once.

use std::sync::atomic::{AtomicBool, Ordering};

use perpliq_telemetry::Metrics;
use tracing::{trace, warn};

use crate::error::{HandlerResult, LiquidationError};

/// Non-reentrant, non-blocking mutual exclusion flag.
#[derive(Debug, Default)]
pub struct ExclusionGuard {
    in_progress: AtomicBool,
}

impl ExclusionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard.
    ///
    /// # Errors
    /// `ReentrancyDetected` if a guarded call is already in progress.
    pub fn enter(&self) -> HandlerResult<ExclusionToken<'_>> {
        match self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                trace!("Exclusion guard acquired");
                Ok(ExclusionToken { guard: self })
            }
            Err(_) => {
                Metrics::guard_contention();
                warn!("Guarded entry refused: call already in progress");
                Err(LiquidationError::ReentrancyDetected)
            }
        }
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    fn exit(&self) {
        self.in_progress.store(false, Ordering::Release);
        trace!("Exclusion guard released");
    }
}

/// Proof of entry. Dropping it releases the guard.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct ExclusionToken<'a> {
    guard: &'a ExclusionGuard,
}

impl ExclusionToken<'_> {
    /// Release explicitly.
    pub fn exit(self) {}
}

impl Drop for ExclusionToken<'_> {
    fn drop(&mut self) {
        self.guard.exit();
    }
}
