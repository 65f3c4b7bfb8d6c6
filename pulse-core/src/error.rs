//! Domain-specific error types for the pulse protocol.
//!
//! All fallible operations return `Result<T, PulseError>`.
//! No panics on invalid input — every error is typed and recoverable.

use thiserror::Error;

/// The canonical error type for the pulse protocol.
#[derive(Debug, Error)]
pub enum PulseError {
    // ── Framing Errors ───────────────────────────────────────────
    /// A frame declared a payload length of zero. An empty frame is
    /// never valid on this wire.
    #[error("zero-length frame")]
    ZeroLengthFrame,

    /// A frame declared a payload larger than the codec limit.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The stream closed in the middle of a frame.
    #[error("stream closed mid-frame with {buffered} bytes buffered")]
    TruncatedFrame { buffered: usize },

    /// The frame payload did not decode to a known message.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// A well-formed message arrived where the protocol forbids it
    /// (e.g. a response-kind message sent by a client).
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    // ── Validation Errors ────────────────────────────────────────
    /// The host string is not a well-formed IPv4 address.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// The port string is empty, non-numeric, or out of range.
    #[error("invalid port: {0:?}")]
    InvalidPort(String),

    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// An mpsc channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    // ── Serialization Errors ─────────────────────────────────────
    /// Encoding of an outbound message failed.
    #[error("encoding error: {0}")]
    Encoding(String),
}

// ── Convenient From implementations ──────────────────────────────

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for PulseError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        PulseError::ChannelClosed
    }
}

impl From<Box<bincode::ErrorKind>> for PulseError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        PulseError::Encoding(e.to_string())
    }
}
