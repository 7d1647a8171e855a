//! # Protocol Error Types
//!
//! Error handling for the range-proof protocol. The session is the unit
//! of recovery: every variant except the non-error proof verdict is fatal
//! to the session that raised it.

use thiserror::Error;

/// Main error type for protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Socket read/write failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame length outside 1..=2^20
    #[error("invalid frame length: {0}")]
    Framing(u32),

    /// Malformed wire data or violated field constraint
    #[error("decode error: {0}")]
    Decode(String),

    /// Message exceeds its encoding bound
    #[error("encode error: {0}")]
    Encode(String),

    /// Well-formed frame that violates the protocol state machine
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Client signature verification failed
    #[error("authentication failed for serial {0}")]
    Auth(String),

    /// Cryptographic primitive failure (signing, RNG)
    #[error("crypto primitive failure: {0}")]
    Primitive(String),

    /// Invalid configuration material
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Operation timed out
    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    /// Peer closed the connection
    #[error("connection closed by peer")]
    ConnectionClosed,
}

/// Result type alias for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;
