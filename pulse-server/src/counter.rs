//! Shared connected-client counter.
//!
//! One `ClientCounter` is owned by the listener and cloned into every
//! handler — never a process global. Increments happen on accept via
//! [`ClientCounter::acquire`]; the returned guard decrements on drop,
//! so a handler that exits through an error path cannot leak a count.
//! Atomics make the read-modify-writes indivisible and the snapshots
//! untearable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide connected-client count, shared by reference.
#[derive(Debug, Clone, Default)]
pub struct ClientCounter {
    inner: Arc<AtomicU64>,
}

impl ClientCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current count.
    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::SeqCst)
    }

    /// Register one connected client. The count stays raised until the
    /// returned guard is dropped.
    pub fn acquire(&self) -> ClientGuard {
        self.inner.fetch_add(1, Ordering::SeqCst);
        ClientGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Holds one unit of the client count for the lifetime of a handler.
#[derive(Debug)]
pub struct ClientGuard {
    inner: Arc<AtomicU64>,
}

impl ClientGuard {
    /// Snapshot the current count (includes this guard's own unit).
    pub fn count(&self) -> u64 {
        self.inner.load(Ordering::SeqCst)
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.inner.fetch_sub(1, Ordering::SeqCst);
    }
}
