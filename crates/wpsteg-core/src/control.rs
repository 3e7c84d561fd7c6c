//! Audit cancellation: a shared flag checked before every request.
//!
//! The fetcher and crawler call [`AuditControl::check`] between requests; once
//! cancellation is requested they stop and return [`AuditCancelled`]. Partial
//! in-memory results are dropped by the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error returned when an audit is stopped by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditCancelled;

impl std::fmt::Display for AuditCancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "audit cancelled by user")
    }
}

impl std::error::Error for AuditCancelled {}

/// Cheaply clonable cancel token shared by every audit in one run.
#[derive(Debug, Clone, Default)]
pub struct AuditControl {
    cancelled: Arc<AtomicBool>,
}

impl AuditControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every audit sharing this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// `Err(AuditCancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<(), AuditCancelled> {
        if self.is_cancelled() {
            Err(AuditCancelled)
        } else {
            Ok(())
        }
    }
}
