//! # pulse-core
//!
//! Protocol library for the pulse fast/slow request demonstrator.
//!
//! This crate contains:
//! - **Messages**: the four-variant [`Message`] wire enum and
//!   [`RequestKind`] mode selector
//! - **Codec**: [`PulseCodec`] for length-prefixed framed TCP I/O via
//!   `tokio_util`
//! - **Network**: [`Connection`] for channel-managed TCP connections
//!   and [`Endpoint`] for validated host/port input
//! - **State**: [`SessionPhase`] / [`ClientSession`] — the client's
//!   connection lifecycle state machine and bookkeeping
//! - **Retry**: [`RetryPolicy`] — bounded reconnect on transient errors
//! - **Error**: [`PulseError`] — typed, `thiserror`-based error hierarchy

pub mod codec;
pub mod error;
pub mod message;
pub mod network;
pub mod retry;
pub mod state;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::{LENGTH_PREFIX, MAX_FRAME_SIZE, PulseCodec};
pub use error::PulseError;
pub use message::{Message, RequestKind};
pub use network::{Connection, ConnectionSender, Endpoint};
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
pub use state::{ClientSession, SessionPhase};
