//! Client configuration.
//!
//! Host and port stay strings all the way to the driver: they are
//! operator input, and the state machine validates them before any
//! socket operation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pulse_core::{ClientSession, RequestKind, RetryPolicy};

/// Top-level configuration for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server to connect to.
    pub server: ServerAddrConfig,
    /// Request cycle timings.
    pub timing: TimingConfig,
    /// Reconnection behavior.
    pub retry: RetryConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Server to connect to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerAddrConfig {
    pub host: String,
    pub port: String,
}

/// Request cycle timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Server-side sleep requested by slow requests (seconds).
    pub sleep_secs: u64,
    /// Pause between fast requests (milliseconds).
    pub fast_timeout_ms: u64,
    /// Wait before a reconnect attempt (milliseconds).
    pub reconnect_timeout_ms: u64,
}

/// Reconnection behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total connection attempts before giving up.
    pub max_attempts: u32,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: ServerAddrConfig::default(),
            timing: TimingConfig::default(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerAddrConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: "5000".into(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sleep_secs: 2,
            fast_timeout_ms: 2000,
            reconnect_timeout_ms: 2000,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: pulse_core::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl ClientConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Build the driver's session state from this configuration.
    pub fn session(&self, kind: RequestKind) -> ClientSession {
        let mut session = ClientSession::new(RetryPolicy::new(self.retry.max_attempts));
        session.set_request_kind(kind);
        session.set_sleep_secs(self.timing.sleep_secs);
        session.set_fast_timeout(Duration::from_millis(self.timing.fast_timeout_ms));
        session.set_reconnect_timeout(Duration::from_millis(self.timing.reconnect_timeout_ms));
        session
    }
}

// ── Tests ────────────────────────────────────────────────────────
