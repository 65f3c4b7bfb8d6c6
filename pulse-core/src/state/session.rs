//! Client-side session bookkeeping.
//!
//! Tracks the connection phase, the consecutive-attempt counter, the
//! retry policy, and the operator-tunable request mode and timings.
//! Owned exclusively by the client driver; nothing here does I/O.

use std::io;
use std::time::Duration;

use crate::message::{Message, RequestKind};
use crate::retry::RetryPolicy;
use crate::state::phase::SessionPhase;

/// Default server-side sleep for slow requests (seconds).
pub const DEFAULT_SLEEP_SECS: u64 = 2;

/// Default pause between fast requests.
pub const DEFAULT_FAST_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default wait before a reconnect attempt.
pub const DEFAULT_RECONNECT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Everything the client state machine owns between intents.
#[derive(Debug)]
pub struct ClientSession {
    /// Current connection lifecycle phase.
    phase: SessionPhase,

    /// Consecutive connection attempts; reset on success or give-up.
    connection_attempt: u32,

    /// Which errors are retried, and how many times.
    retry: RetryPolicy,

    /// Which request the cycle currently issues.
    request_kind: RequestKind,

    /// Requested server-side sleep for slow requests.
    sleep_secs: u64,

    /// Pause between fast requests.
    fast_timeout: Duration,

    /// Wait before re-attempting a failed connection.
    reconnect_timeout: Duration,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl ClientSession {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            phase: SessionPhase::default(),
            connection_attempt: 0,
            retry,
            request_kind: RequestKind::default(),
            sleep_secs: DEFAULT_SLEEP_SECS,
            fast_timeout: DEFAULT_FAST_TIMEOUT,
            reconnect_timeout: DEFAULT_RECONNECT_TIMEOUT,
        }
    }

    // ── Connection Phase ─────────────────────────────────────────

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn phase_mut(&mut self) -> &mut SessionPhase {
        &mut self.phase
    }

    // ── Attempt Tracking ─────────────────────────────────────────

    /// Record a new connection attempt and return its number (1-based).
    pub fn begin_attempt(&mut self) -> u32 {
        self.connection_attempt += 1;
        self.connection_attempt
    }

    /// Reset the attempt counter: on successful connect, or when
    /// giving up so a later manual retry starts fresh.
    pub fn reset_attempts(&mut self) {
        self.connection_attempt = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.connection_attempt
    }

    /// Should the attempt that just failed with `err` be retried?
    pub fn should_retry(&self, err: &io::Error) -> bool {
        self.retry.should_retry(err, self.connection_attempt)
    }

    // ── Request Cycle ────────────────────────────────────────────

    /// Build the next request for the current mode.
    pub fn next_request(&self) -> Message {
        match self.request_kind {
            RequestKind::Fast => Message::FastRequest,
            RequestKind::Slow => Message::SlowRequest {
                sleep_secs: self.sleep_secs,
            },
        }
    }

    pub fn request_kind(&self) -> RequestKind {
        self.request_kind
    }

    pub fn set_request_kind(&mut self, kind: RequestKind) {
        self.request_kind = kind;
    }

    // ── Timings ──────────────────────────────────────────────────

    pub fn sleep_secs(&self) -> u64 {
        self.sleep_secs
    }

    pub fn set_sleep_secs(&mut self, secs: u64) {
        self.sleep_secs = secs;
    }

    pub fn fast_timeout(&self) -> Duration {
        self.fast_timeout
    }

    pub fn set_fast_timeout(&mut self, timeout: Duration) {
        self.fast_timeout = timeout;
    }

    pub fn reconnect_timeout(&self) -> Duration {
        self.reconnect_timeout
    }

    pub fn set_reconnect_timeout(&mut self, timeout: Duration) {
        self.reconnect_timeout = timeout;
    }
}

// ── Tests ────────────────────────────────────────────────────────
