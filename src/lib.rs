//! # Secure Range-Proof Server
//!
//! This crate implements a TCP server that authenticates
//! hardware-identified clients and verifies Pedersen-commitment range
//! proofs:
//! - ECDSA challenge-response handshake over secp256k1
//! - Length-prefixed binary framing
//! - Protobuf-compatible envelope and message codec
//! - Algebraic range-proof verification on compressed curve points
//!
//! ## Protocol Overview
//!
//! ```text
//! Client                                  Server
//!   |                                        |
//!   |-- ClientHello (serial, sig) ---------->|
//!   |                                        |
//!   |<- ServerChallenge (nonce, sig) --------|
//!   |                                        |
//!   |-- ClientResponse (sig over nonce) ---->|
//!   |                                        |
//!   |<- AuthResult (ok) ---------------------|
//!   |                                        |
//!   |-- RangeProofRequest ------------------>|
//!   |<- RangeProofResult --------------------|
//!   |              ... repeat ...            |
//! ```
//!
//! ## Security Properties
//!
//! - Mutual authentication: the client signs its serial and the server's
//!   nonce; the server signs `serial ∥ nonce` so the challenge is bound
//!   to the claimed identity
//! - Statically provisioned client public keys (no PKI)
//! - Proof verification relies only on public commitments; the blinding
//!   base H cancels out of every checked equality

pub mod config;
pub mod crypto;
pub mod error;
pub mod frame;
pub mod messages;
pub mod proof;
pub mod prover;
pub mod session;
pub mod transport;
pub mod wire;

pub use config::*;
pub use crypto::*;
pub use error::*;
pub use frame::*;
pub use messages::*;
pub use proof::*;
pub use prover::*;
pub use session::*;
pub use transport::*;

/// Maximum frame payload size (1 MiB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum envelope payload size
pub const MAX_PAYLOAD_SIZE: usize = 2048;

/// Compressed secp256k1 point size
pub const POINT_LEN: usize = 33;

/// ECDSA signature size (r ∥ s, both 32 bytes big-endian)
pub const SIG_LEN: usize = 64;

/// Server challenge nonce size
pub const NONCE_LEN: usize = 32;

/// Private scalar size
pub const PRIV_LEN: usize = 32;

/// SHA-256 digest size
pub const DIGEST_LEN: usize = 32;

/// Number of commitment terms in each four-square decomposition
pub const COMMIT_TERMS: usize = 4;

/// Maximum client serial identifier length in bytes
pub const MAX_SERIAL_LEN: usize = 63;

/// Maximum `AuthResult` message length in bytes
pub const MAX_AUTH_MESSAGE_LEN: usize = 63;

/// Maximum `RangeProofResult` message length in bytes
pub const MAX_PROOF_MESSAGE_LEN: usize = 95;

/// Compressed curve point on the wire
pub type Point33 = [u8; POINT_LEN];

/// Raw ECDSA signature on the wire
pub type Sig64 = [u8; SIG_LEN];

/// SHA-256 output
pub type Digest32 = [u8; DIGEST_LEN];
