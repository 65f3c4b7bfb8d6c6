//! Reconnection policy: which connection errors are worth retrying,
//! and how many attempts to spend before giving up.
//!
//! Transient conditions (a refused connect while the server restarts,
//! a reset on a flaky link) are auto-retried; everything else is
//! surfaced immediately so a permanently unreachable host cannot spin
//! the client in an infinite reconnect loop.

use std::io;

/// Default total connection attempts before surfacing a fatal error.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Error categories considered transient.
const RETRYABLE_KINDS: &[io::ErrorKind] = &[
    io::ErrorKind::ConnectionRefused,
    io::ErrorKind::ConnectionReset,
    io::ErrorKind::ConnectionAborted,
    io::ErrorKind::TimedOut,
    io::ErrorKind::NetworkUnreachable,
    io::ErrorKind::HostUnreachable,
];

/// Bounded-retry filter for connection errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    retryable: Vec<io::ErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retryable: RETRYABLE_KINDS.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Is this error category transient?
    pub fn is_retryable(&self, err: &io::Error) -> bool {
        self.retryable.contains(&err.kind())
    }

    /// Retry only while the category is transient and the attempt
    /// budget is not exhausted. `attempts` counts connections already
    /// tried, including the one that just failed.
    pub fn should_retry(&self, err: &io::Error, attempts: u32) -> bool {
        self.is_retryable(err) && attempts < self.max_attempts
    }
}
