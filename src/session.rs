//! # Session State Machine
//!
//! Drives one client connection through the protocol:
//!
//! ```text
//! AwaitHello --ClientHello--> AwaitResponse --ClientResponse--> Authed
//! ```
//!
//! An authenticated session verifies any number of range-proof requests.
//! Every decode failure, I/O error, or out-of-phase message ends the
//! session; the only reply sent on a failure path is the negative
//! `AuthResult` before closing.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::config::{ClientRegistry, ServerKeys};
use crate::crypto::{ecdsa_sign_digest, ecdsa_verify_digest, random_bytes, sha256};
use crate::error::{ProtocolError, ProtocolResult};
use crate::messages::{
    AuthResult, ClientHello, ClientResponse, Envelope, MessageType, RangeProofRequest,
    RangeProofResult, ServerChallenge,
};
use crate::proof::verify_range_proof;
use crate::transport::Transport;
use crate::{Point33, Sig64, NONCE_LEN};

/// Session progress through the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the client to identify itself
    AwaitHello,
    /// Challenge issued, waiting for the signed nonce
    AwaitResponse,
    /// Mutually authenticated; range proofs accepted
    Authed,
}

/// Per-connection protocol driver
///
/// Exclusively owns its transport and mutable state; shares the server
/// keys and client registry read-only with every other session.
pub struct Session {
    transport: Transport,
    phase: Phase,
    keys: Arc<ServerKeys>,
    registry: Arc<ClientRegistry>,
    authed_serial: String,
    client_pub: Point33,
    nonce: [u8; NONCE_LEN],
}

impl Session {
    pub fn new(transport: Transport, keys: Arc<ServerKeys>, registry: Arc<ClientRegistry>) -> Self {
        Self {
            transport,
            phase: Phase::AwaitHello,
            keys,
            registry,
            authed_serial: String::new(),
            client_pub: [0u8; 33],
            nonce: [0u8; NONCE_LEN],
        }
    }

    /// Run the session until the peer disconnects or a protocol violation
    /// ends it. The socket closes when the session is dropped.
    pub async fn run(mut self) -> ProtocolResult<()> {
        loop {
            let frame = match self.transport.recv_frame().await {
                Ok(frame) => frame,
                Err(ProtocolError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e),
            };
            let env = Envelope::decode(&frame)?;

            match (self.phase, env.msg_type) {
                (Phase::AwaitHello, MessageType::ClientHello) => {
                    self.handle_hello(&env.payload).await?
                }
                (Phase::AwaitResponse, MessageType::ClientResponse) => {
                    self.handle_response(&env.payload).await?
                }
                (Phase::Authed, MessageType::RangeProofRequest) => {
                    self.handle_range_proof(&env.payload, env.request_id).await?
                }
                (phase, msg_type) => {
                    return Err(ProtocolError::Protocol(format!(
                        "unexpected {msg_type:?} in phase {phase:?}"
                    )))
                }
            }
        }
    }

    fn sig64(raw: &[u8]) -> ProtocolResult<Sig64> {
        raw.try_into()
            .map_err(|_| ProtocolError::Protocol("signature must be exactly 64 bytes".into()))
    }

    async fn handle_hello(&mut self, payload: &[u8]) -> ProtocolResult<()> {
        let hello = ClientHello::decode(payload)?;
        let sig = Self::sig64(&hello.sig)?;

        let client_pub = *self.registry.lookup(&hello.serial_id).ok_or_else(|| {
            ProtocolError::Protocol(format!("unknown client serial: {}", hello.serial_id))
        })?;

        let digest = sha256(hello.serial_id.as_bytes());
        if !ecdsa_verify_digest(&client_pub, &digest, &sig) {
            warn!(serial = %hello.serial_id, "client hello signature verification failed");
            return Err(ProtocolError::Auth(hello.serial_id));
        }

        self.client_pub = client_pub;
        self.authed_serial = hello.serial_id;
        random_bytes(&mut self.nonce)?;

        // Sign sha256(serial || nonce) so the client can bind the
        // challenge to its serial.
        let mut bound = Vec::with_capacity(self.authed_serial.len() + NONCE_LEN);
        bound.extend_from_slice(self.authed_serial.as_bytes());
        bound.extend_from_slice(&self.nonce);
        let server_sig = ecdsa_sign_digest(&self.keys.server_priv, &sha256(&bound))?;

        let challenge = ServerChallenge {
            nonce: self.nonce.to_vec(),
            server_sig: server_sig.to_vec(),
        };
        self.send(MessageType::ServerChallenge, challenge.encode()?, None)
            .await?;

        debug!(serial = %self.authed_serial, "challenge issued");
        self.phase = Phase::AwaitResponse;
        Ok(())
    }

    async fn handle_response(&mut self, payload: &[u8]) -> ProtocolResult<()> {
        let response = ClientResponse::decode(payload)?;
        let sig = Self::sig64(&response.sig)?;

        let digest = sha256(&self.nonce);
        if !ecdsa_verify_digest(&self.client_pub, &digest, &sig) {
            warn!(serial = %self.authed_serial, "client response signature verification failed");
            let result = AuthResult {
                ok: false,
                message: Some("auth failed".into()),
            };
            self.send(MessageType::AuthResult, result.encode()?, None)
                .await?;
            return Err(ProtocolError::Auth(self.authed_serial.clone()));
        }

        info!(serial = %self.authed_serial, "client verified");
        let result = AuthResult {
            ok: true,
            message: Some("auth ok".into()),
        };
        self.send(MessageType::AuthResult, result.encode()?, None)
            .await?;
        self.phase = Phase::Authed;
        Ok(())
    }

    async fn handle_range_proof(
        &mut self,
        payload: &[u8],
        request_id: Option<u32>,
    ) -> ProtocolResult<()> {
        let request = RangeProofRequest::decode(payload)?;

        let verdict = verify_range_proof(&request);
        if verdict.ok {
            info!(serial = %self.authed_serial, "range proof ok: {}", verdict.message);
        } else {
            warn!(serial = %self.authed_serial, "range proof failed: {}", verdict.message);
        }

        let result = RangeProofResult {
            ok: verdict.ok,
            message: Some(verdict.message),
        };
        self.send(MessageType::RangeProofResult, result.encode()?, request_id)
            .await
    }

    async fn send(
        &mut self,
        msg_type: MessageType,
        payload: Bytes,
        request_id: Option<u32>,
    ) -> ProtocolResult<()> {
        let env = Envelope {
            msg_type,
            payload,
            request_id,
        };
        self.transport.send_frame(&env.encode()?).await
    }
}
