//! Protocol message types.
//!
//! Exactly one request/response pair per request kind. The enum makes
//! the "exactly one variant populated" wire invariant hold by
//! construction — there is no way to build an empty or ambiguous
//! message.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Message ──────────────────────────────────────────────────────

/// One wire message. Requests flow client → server, responses flow
/// server → client; the codec itself is symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Ask the server to respond immediately with its current time.
    FastRequest,

    /// Ask the server to sleep `sleep_secs` before responding with
    /// its connected-client count.
    SlowRequest { sleep_secs: u64 },

    /// Immediate answer to a [`Message::FastRequest`].
    FastResponse { current_time: String },

    /// Delayed answer to a [`Message::SlowRequest`], carrying a
    /// snapshot of the server's connected-client count taken at
    /// response time.
    SlowResponse { connected_clients: u64 },
}

impl Message {
    /// Returns `true` for the two client-initiated kinds.
    pub fn is_request(&self) -> bool {
        matches!(self, Message::FastRequest | Message::SlowRequest { .. })
    }

    /// Returns `true` for the two server-initiated kinds.
    pub fn is_response(&self) -> bool {
        !self.is_request()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::FastRequest => write!(f, "FastRequest"),
            Message::SlowRequest { sleep_secs } => {
                write!(f, "SlowRequest(sleep {sleep_secs}s)")
            }
            Message::FastResponse { current_time } => {
                write!(f, "FastResponse({current_time})")
            }
            Message::SlowResponse { connected_clients } => {
                write!(f, "SlowResponse({connected_clients} clients)")
            }
        }
    }
}

// ── RequestKind ──────────────────────────────────────────────────

/// Which of the two requests the client is currently issuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestKind {
    /// Answered immediately; the client paces the loop with its own
    /// timeout between requests.
    #[default]
    Fast,
    /// Answered after a server-side sleep, which paces the loop by
    /// itself.
    Slow,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Fast => write!(f, "fast"),
            RequestKind::Slow => write!(f, "slow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_response_partition() {
        assert!(Message::FastRequest.is_request());
        assert!(Message::SlowRequest { sleep_secs: 2 }.is_request());
        assert!(
            Message::FastResponse {
                current_time: "now".into()
            }
            .is_response()
        );
        assert!(Message::SlowResponse { connected_clients: 1 }.is_response());
    }

    #[test]
    fn display_names() {
        assert_eq!(Message::FastRequest.to_string(), "FastRequest");
        assert_eq!(
            Message::SlowRequest { sleep_secs: 3 }.to_string(),
            "SlowRequest(sleep 3s)"
        );
        assert_eq!(RequestKind::Fast.to_string(), "fast");
        assert_eq!(RequestKind::Slow.to_string(), "slow");
    }

    #[test]
    fn default_kind_is_fast() {
        assert_eq!(RequestKind::default(), RequestKind::Fast);
    }
}
