//! Client connection lifecycle state machine.
//!
//! Provides a `SessionPhase` enum that models the full lifecycle of
//! the client's server connection, with validated transitions that
//! return `Result` instead of panicking.

use std::time::Instant;

use crate::error::PulseError;

// ── SessionPhase ─────────────────────────────────────────────────

/// The current phase of the client's server connection.
///
/// ```text
///  Idle ──► Connecting ──► Connected
///   ▲           │              │
///   │           ▼              ▼
///   └──── Disconnecting ◄──────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No active connection. Initial / terminal state.
    #[default]
    Idle,

    /// TCP connection initiated (or being retried) but not yet
    /// established.
    Connecting,

    /// Connection established; the request/response cycle is running.
    Connected {
        /// When the connection entered the `Connected` state.
        since: Instant,
    },

    /// Shutdown in progress (local disconnect or peer close observed).
    Disconnecting,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected { .. } => write!(f, "Connected"),
            Self::Disconnecting => write!(f, "Disconnecting"),
        }
    }
}

impl SessionPhase {
    /// Returns `true` when the request/response cycle may run.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Returns `true` when no connection exists or is being attempted.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// How long the connection has been in the `Connected` state.
    ///
    /// Returns `None` for any other phase.
    pub fn connected_duration(&self) -> Option<std::time::Duration> {
        match self {
            Self::Connected { since } => Some(since.elapsed()),
            _ => None,
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Transition to `Connecting`.
    ///
    /// Valid from: `Idle`. A failed attempt that will be retried
    /// stays in `Connecting`.
    pub fn begin_connect(&mut self) -> Result<(), PulseError> {
        match self {
            Self::Idle => {
                *self = Self::Connecting;
                Ok(())
            }
            _ => Err(PulseError::ProtocolViolation(
                "cannot connect: not in Idle state",
            )),
        }
    }

    /// Transition to `Connected`.
    ///
    /// Valid from: `Connecting`.
    pub fn complete_connect(&mut self) -> Result<(), PulseError> {
        match self {
            Self::Connecting => {
                *self = Self::Connected {
                    since: Instant::now(),
                };
                Ok(())
            }
            _ => Err(PulseError::ProtocolViolation(
                "cannot complete connect: not in Connecting state",
            )),
        }
    }

    /// Transition to `Disconnecting`.
    ///
    /// Valid from: `Connected`, `Connecting` (user cancels a pending
    /// attempt or reconnect wait).
    pub fn begin_disconnect(&mut self) -> Result<(), PulseError> {
        match self {
            Self::Connecting | Self::Connected { .. } => {
                *self = Self::Disconnecting;
                Ok(())
            }
            _ => Err(PulseError::ProtocolViolation(
                "cannot disconnect: not in Connecting or Connected state",
            )),
        }
    }

    /// Transition to `Idle`.
    ///
    /// Valid from: `Disconnecting`, `Connecting` (attempt failed and
    /// retries are exhausted or the category is fatal).
    pub fn finish_disconnect(&mut self) -> Result<(), PulseError> {
        match self {
            Self::Disconnecting | Self::Connecting => {
                *self = Self::Idle;
                Ok(())
            }
            _ => Err(PulseError::ProtocolViolation(
                "cannot finish disconnect: not in a disconnectable state",
            )),
        }
    }

    /// Force-reset to `Idle` regardless of current state.
    ///
    /// Use this for I/O failure mid-stream, where the precise phase
    /// no longer matters.
    pub fn force_idle(&mut self) {
        *self = Self::Idle;
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_lifecycle() {
        let mut phase = SessionPhase::Idle;

        phase.begin_connect().unwrap();
        assert_eq!(phase, SessionPhase::Connecting);

        phase.complete_connect().unwrap();
        assert!(phase.is_connected());
        assert!(phase.connected_duration().is_some());

        phase.begin_disconnect().unwrap();
        assert_eq!(phase, SessionPhase::Disconnecting);

        phase.finish_disconnect().unwrap();
        assert!(phase.is_idle());
    }

    #[test]
    fn invalid_transition_connect_when_connected() {
        let mut phase = SessionPhase::Connected {
            since: Instant::now(),
        };
        assert!(phase.begin_connect().is_err());
    }

    #[test]
    fn invalid_transition_complete_from_idle() {
        let mut phase = SessionPhase::Idle;
        assert!(phase.complete_connect().is_err());
    }

    #[test]
    fn cancel_pending_attempt() {
        let mut phase = SessionPhase::Connecting;
        phase.begin_disconnect().unwrap();
        assert_eq!(phase, SessionPhase::Disconnecting);
        phase.finish_disconnect().unwrap();
        assert!(phase.is_idle());
    }

    #[test]
    fn give_up_from_connecting() {
        let mut phase = SessionPhase::Connecting;
        phase.finish_disconnect().unwrap();
        assert!(phase.is_idle());
    }

    #[test]
    fn force_idle_from_any_state() {
        let mut phase = SessionPhase::Connected {
            since: Instant::now(),
        };
        phase.force_idle();
        assert!(phase.is_idle());
    }

    #[test]
    fn display_format() {
        assert_eq!(SessionPhase::Idle.to_string(), "Idle");
        assert_eq!(SessionPhase::Connecting.to_string(), "Connecting");
        assert_eq!(
            SessionPhase::Connected {
                since: Instant::now()
            }
            .to_string(),
            "Connected"
        );
        assert_eq!(SessionPhase::Disconnecting.to_string(), "Disconnecting");
    }

    #[test]
    fn default_phase_is_idle() {
        assert!(SessionPhase::default().is_idle());
    }
}
