//! Sequence-number gate for stale-response suppression.
//!
//! No transport-level cancellation is assumed; instead every request
//! carries a strictly increasing sequence number and only the response
//! with the highest number seen so far is applied. Completion order is
//! irrelevant.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues sequence numbers and admits only the freshest response.
#[derive(Debug, Default)]
pub struct SeqGate {
    issued: AtomicU64,
    admitted: AtomicU64,
}

impl SeqGate {
    /// Create a gate with no requests issued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            admitted: AtomicU64::new(0),
        }
    }

    /// Allocate the next sequence number (strictly increasing, starts at 1).
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Try to admit a completed response.
    ///
    /// Returns `true` exactly when `seq` is higher than every previously
    /// admitted sequence number; the caller must discard the response
    /// otherwise.
    pub fn admit(&self, seq: u64) -> bool {
        self.admitted.fetch_max(seq, Ordering::AcqRel) < seq
    }
}
