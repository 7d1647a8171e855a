//! # Envelope and Message Codec
//!
//! Typed protocol messages and their protobuf-compatible encodings. Every
//! frame payload is an [`Envelope`] carrying a message type, an opaque
//! inner payload, and an optional request id. Decoders accept fields in
//! any order and skip unknown fields; encoders emit fields in ascending
//! tag order and omit default values.
//!
//! Field tags:
//!
//! | Message           | Fields                                             |
//! |-------------------|----------------------------------------------------|
//! | Envelope          | type=1, payload=2, request_id=3                    |
//! | ClientHello       | serial_id=1, sig=2                                 |
//! | ServerChallenge   | nonce=1, server_sig=2                              |
//! | ClientResponse    | sig=1                                              |
//! | AuthResult        | ok=1, message=2                                    |
//! | RangeProofRequest | min=1, max=2, bitlen=3, c1=4, c2=5,                |
//! |                   | lower_commit=6, upper_commit=7                     |
//! | RangeProofResult  | ok=1, message=2                                    |

use bytes::Bytes;

use crate::error::{ProtocolError, ProtocolResult};
use crate::wire::{
    expect_wire, get_bytes, get_field_header, get_varint, skip_field, BoundedWriter, WireType,
};
use crate::{
    Point33, COMMIT_TERMS, MAX_AUTH_MESSAGE_LEN, MAX_PAYLOAD_SIZE, MAX_PROOF_MESSAGE_LEN,
    MAX_SERIAL_LEN, POINT_LEN,
};

/// Encoding bound for an envelope: type + full payload + request id
pub const ENVELOPE_MAX_SIZE: usize = 2064;
/// Encoding bound for a client hello
pub const CLIENT_HELLO_MAX_SIZE: usize = 136;
/// Encoding bound for a server challenge
pub const SERVER_CHALLENGE_MAX_SIZE: usize = 104;
/// Encoding bound for a client response
pub const CLIENT_RESPONSE_MAX_SIZE: usize = 72;
/// Encoding bound for an auth result
pub const AUTH_RESULT_MAX_SIZE: usize = 72;
/// Encoding bound for a range-proof request
pub const RANGE_PROOF_REQUEST_MAX_SIZE: usize = 384;
/// Encoding bound for a range-proof result
pub const RANGE_PROOF_RESULT_MAX_SIZE: usize = 104;

/// Message types in the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Client identifies itself and signs its serial
    ClientHello = 1,
    /// Server issues a signed random challenge
    ServerChallenge = 2,
    /// Client signs the challenge nonce
    ClientResponse = 3,
    /// Server reports authentication outcome
    AuthResult = 4,
    /// Authenticated client submits a range proof
    RangeProofRequest = 5,
    /// Server reports the proof verdict
    RangeProofResult = 6,
}

impl TryFrom<u64> for MessageType {
    type Error = ProtocolError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageType::ClientHello),
            2 => Ok(MessageType::ServerChallenge),
            3 => Ok(MessageType::ClientResponse),
            4 => Ok(MessageType::AuthResult),
            5 => Ok(MessageType::RangeProofRequest),
            6 => Ok(MessageType::RangeProofResult),
            _ => Err(ProtocolError::Decode(format!(
                "unknown message type: {value}"
            ))),
        }
    }
}

/// Truncate a string to at most `max` bytes on a char boundary.
fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn decode_string(raw: &[u8], max: usize, what: &str) -> ProtocolResult<String> {
    if raw.len() > max {
        return Err(ProtocolError::Decode(format!(
            "{what} exceeds {max} bytes"
        )));
    }
    let s = std::str::from_utf8(raw)
        .map_err(|_| ProtocolError::Decode(format!("{what} is not valid UTF-8")))?;
    Ok(s.to_owned())
}

fn decode_point(raw: &[u8]) -> ProtocolResult<Point33> {
    raw.try_into().map_err(|_| {
        ProtocolError::Decode(format!(
            "point field must be exactly {POINT_LEN} bytes, got {}",
            raw.len()
        ))
    })
}

/// Outer typed envelope framing every protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub msg_type: MessageType,
    pub payload: Bytes,
    pub request_id: Option<u32>,
}

impl Envelope {
    /// Serialize to canonical wire bytes.
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::Encode("payload too large".into()));
        }
        let mut w = BoundedWriter::new(ENVELOPE_MAX_SIZE);
        w.put_uint_field(1, self.msg_type as u64)?;
        w.put_bytes_field(2, &self.payload)?;
        if let Some(id) = self.request_id {
            w.put_uint_field(3, id as u64)?;
        }
        Ok(w.finish())
    }

    /// Parse from wire bytes. `type` and `payload` are required.
    pub fn decode(mut buf: &[u8]) -> ProtocolResult<Self> {
        let mut msg_type = None;
        let mut payload = None;
        let mut request_id = None;

        while !buf.is_empty() {
            let h = get_field_header(&mut buf)?;
            match h.tag {
                1 => {
                    expect_wire(h, WireType::Varint)?;
                    msg_type = Some(MessageType::try_from(get_varint(&mut buf)?)?);
                }
                2 => {
                    expect_wire(h, WireType::Len)?;
                    let raw = get_bytes(&mut buf)?;
                    if raw.len() > MAX_PAYLOAD_SIZE {
                        return Err(ProtocolError::Decode("payload too large".into()));
                    }
                    payload = Some(Bytes::copy_from_slice(raw));
                }
                3 => {
                    expect_wire(h, WireType::Varint)?;
                    let v = get_varint(&mut buf)?;
                    if v > u32::MAX as u64 {
                        return Err(ProtocolError::Decode("request_id out of range".into()));
                    }
                    request_id = Some(v as u32);
                }
                _ => skip_field(&mut buf, h.wire_type)?,
            }
        }

        let msg_type =
            msg_type.ok_or_else(|| ProtocolError::Decode("missing envelope type".into()))?;
        let payload =
            payload.ok_or_else(|| ProtocolError::Decode("missing envelope payload".into()))?;
        Ok(Self {
            msg_type,
            payload,
            request_id,
        })
    }
}

/// Client's opening message: serial identifier plus a signature over
/// `sha256(serial_id)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    pub serial_id: String,
    pub sig: Vec<u8>,
}

impl ClientHello {
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let mut w = BoundedWriter::new(CLIENT_HELLO_MAX_SIZE);
        w.put_bytes_field(1, truncate_utf8(&self.serial_id, MAX_SERIAL_LEN).as_bytes())?;
        w.put_bytes_field(2, &self.sig)?;
        Ok(w.finish())
    }

    pub fn decode(mut buf: &[u8]) -> ProtocolResult<Self> {
        let mut serial_id = String::new();
        let mut sig = Vec::new();

        while !buf.is_empty() {
            let h = get_field_header(&mut buf)?;
            match h.tag {
                1 => {
                    expect_wire(h, WireType::Len)?;
                    serial_id = decode_string(get_bytes(&mut buf)?, MAX_SERIAL_LEN, "serial_id")?;
                }
                2 => {
                    expect_wire(h, WireType::Len)?;
                    sig = get_bytes(&mut buf)?.to_vec();
                }
                _ => skip_field(&mut buf, h.wire_type)?,
            }
        }

        if serial_id.is_empty() {
            return Err(ProtocolError::Decode("serial_id must be 1..63 bytes".into()));
        }
        Ok(Self { serial_id, sig })
    }
}

/// Server's random challenge, signed over `sha256(serial_id ∥ nonce)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerChallenge {
    pub nonce: Vec<u8>,
    pub server_sig: Vec<u8>,
}

impl ServerChallenge {
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let mut w = BoundedWriter::new(SERVER_CHALLENGE_MAX_SIZE);
        w.put_bytes_field(1, &self.nonce)?;
        w.put_bytes_field(2, &self.server_sig)?;
        Ok(w.finish())
    }

    pub fn decode(mut buf: &[u8]) -> ProtocolResult<Self> {
        let mut nonce = Vec::new();
        let mut server_sig = Vec::new();

        while !buf.is_empty() {
            let h = get_field_header(&mut buf)?;
            match h.tag {
                1 => {
                    expect_wire(h, WireType::Len)?;
                    nonce = get_bytes(&mut buf)?.to_vec();
                }
                2 => {
                    expect_wire(h, WireType::Len)?;
                    server_sig = get_bytes(&mut buf)?.to_vec();
                }
                _ => skip_field(&mut buf, h.wire_type)?,
            }
        }
        Ok(Self { nonce, server_sig })
    }
}

/// Client's answer: a signature over `sha256(nonce)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientResponse {
    pub sig: Vec<u8>,
}

impl ClientResponse {
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let mut w = BoundedWriter::new(CLIENT_RESPONSE_MAX_SIZE);
        w.put_bytes_field(1, &self.sig)?;
        Ok(w.finish())
    }

    pub fn decode(mut buf: &[u8]) -> ProtocolResult<Self> {
        let mut sig = Vec::new();

        while !buf.is_empty() {
            let h = get_field_header(&mut buf)?;
            match h.tag {
                1 => {
                    expect_wire(h, WireType::Len)?;
                    sig = get_bytes(&mut buf)?.to_vec();
                }
                _ => skip_field(&mut buf, h.wire_type)?,
            }
        }
        Ok(Self { sig })
    }
}

/// Authentication outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub ok: bool,
    pub message: Option<String>,
}

impl AuthResult {
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let mut w = BoundedWriter::new(AUTH_RESULT_MAX_SIZE);
        if self.ok {
            w.put_uint_field(1, 1)?;
        }
        if let Some(m) = &self.message {
            w.put_bytes_field(2, truncate_utf8(m, MAX_AUTH_MESSAGE_LEN).as_bytes())?;
        }
        Ok(w.finish())
    }

    pub fn decode(mut buf: &[u8]) -> ProtocolResult<Self> {
        let mut ok = false;
        let mut message = None;

        while !buf.is_empty() {
            let h = get_field_header(&mut buf)?;
            match h.tag {
                1 => {
                    expect_wire(h, WireType::Varint)?;
                    ok = get_varint(&mut buf)? != 0;
                }
                2 => {
                    expect_wire(h, WireType::Len)?;
                    message = Some(decode_string(
                        get_bytes(&mut buf)?,
                        MAX_AUTH_MESSAGE_LEN,
                        "message",
                    )?);
                }
                _ => skip_field(&mut buf, h.wire_type)?,
            }
        }
        Ok(Self { ok, message })
    }
}

/// A range-proof submission: interval bounds plus the commitment points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeProofRequest {
    pub min: u64,
    pub max: u64,
    pub bitlen: u32,
    pub c1: Point33,
    pub c2: Point33,
    pub lower_commit: Vec<Point33>,
    pub upper_commit: Vec<Point33>,
}

impl RangeProofRequest {
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let mut w = BoundedWriter::new(RANGE_PROOF_REQUEST_MAX_SIZE);
        if self.min != 0 {
            w.put_uint_field(1, self.min)?;
        }
        if self.max != 0 {
            w.put_uint_field(2, self.max)?;
        }
        if self.bitlen != 0 {
            w.put_uint_field(3, self.bitlen as u64)?;
        }
        w.put_bytes_field(4, &self.c1)?;
        w.put_bytes_field(5, &self.c2)?;
        for p in &self.lower_commit {
            w.put_bytes_field(6, p)?;
        }
        for p in &self.upper_commit {
            w.put_bytes_field(7, p)?;
        }
        Ok(w.finish())
    }

    pub fn decode(mut buf: &[u8]) -> ProtocolResult<Self> {
        let mut out = Self {
            min: 0,
            max: 0,
            bitlen: 0,
            c1: [0u8; POINT_LEN],
            c2: [0u8; POINT_LEN],
            lower_commit: Vec::with_capacity(COMMIT_TERMS),
            upper_commit: Vec::with_capacity(COMMIT_TERMS),
        };

        while !buf.is_empty() {
            let h = get_field_header(&mut buf)?;
            match h.tag {
                1 => {
                    expect_wire(h, WireType::Varint)?;
                    out.min = get_varint(&mut buf)?;
                }
                2 => {
                    expect_wire(h, WireType::Varint)?;
                    out.max = get_varint(&mut buf)?;
                }
                3 => {
                    expect_wire(h, WireType::Varint)?;
                    let v = get_varint(&mut buf)?;
                    if v > u32::MAX as u64 {
                        return Err(ProtocolError::Decode("bitlen out of range".into()));
                    }
                    out.bitlen = v as u32;
                }
                4 => {
                    expect_wire(h, WireType::Len)?;
                    out.c1 = decode_point(get_bytes(&mut buf)?)?;
                }
                5 => {
                    expect_wire(h, WireType::Len)?;
                    out.c2 = decode_point(get_bytes(&mut buf)?)?;
                }
                6 => {
                    expect_wire(h, WireType::Len)?;
                    if out.lower_commit.len() >= COMMIT_TERMS {
                        return Err(ProtocolError::Decode(
                            "too many lower_commit points".into(),
                        ));
                    }
                    out.lower_commit.push(decode_point(get_bytes(&mut buf)?)?);
                }
                7 => {
                    expect_wire(h, WireType::Len)?;
                    if out.upper_commit.len() >= COMMIT_TERMS {
                        return Err(ProtocolError::Decode(
                            "too many upper_commit points".into(),
                        ));
                    }
                    out.upper_commit.push(decode_point(get_bytes(&mut buf)?)?);
                }
                _ => skip_field(&mut buf, h.wire_type)?,
            }
        }
        Ok(out)
    }
}

/// Proof verdict returned to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeProofResult {
    pub ok: bool,
    pub message: Option<String>,
}

impl RangeProofResult {
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let mut w = BoundedWriter::new(RANGE_PROOF_RESULT_MAX_SIZE);
        if self.ok {
            w.put_uint_field(1, 1)?;
        }
        if let Some(m) = &self.message {
            w.put_bytes_field(2, truncate_utf8(m, MAX_PROOF_MESSAGE_LEN).as_bytes())?;
        }
        Ok(w.finish())
    }

    pub fn decode(mut buf: &[u8]) -> ProtocolResult<Self> {
        let mut ok = false;
        let mut message = None;

        while !buf.is_empty() {
            let h = get_field_header(&mut buf)?;
            match h.tag {
                1 => {
                    expect_wire(h, WireType::Varint)?;
                    ok = get_varint(&mut buf)? != 0;
                }
                2 => {
                    expect_wire(h, WireType::Len)?;
                    message = Some(decode_string(
                        get_bytes(&mut buf)?,
                        MAX_PROOF_MESSAGE_LEN,
                        "message",
                    )?);
                }
                _ => skip_field(&mut buf, h.wire_type)?,
            }
        }
        Ok(Self { ok, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_point(fill: u8) -> Point33 {
        let mut p = [fill; POINT_LEN];
        p[0] = 0x02;
        p
    }

    fn sample_request() -> RangeProofRequest {
        RangeProofRequest {
            min: 10,
            max: 20,
            bitlen: 5,
            c1: sample_point(0x11),
            c2: sample_point(0x22),
            lower_commit: (0..4).map(|i| sample_point(0x30 + i)).collect(),
            upper_commit: (0..4).map(|i| sample_point(0x40 + i)).collect(),
        }
    }

    #[test]
    fn test_envelope_roundtrip() {
        let env = Envelope {
            msg_type: MessageType::RangeProofRequest,
            payload: Bytes::from_static(b"inner"),
            request_id: Some(42),
        };
        let encoded = env.encode().unwrap();
        assert_eq!(Envelope::decode(&encoded).unwrap(), env);

        let no_id = Envelope {
            msg_type: MessageType::ClientHello,
            payload: Bytes::from_static(b"x"),
            request_id: None,
        };
        let encoded = no_id.encode().unwrap();
        assert_eq!(Envelope::decode(&encoded).unwrap(), no_id);
    }

    #[test]
    fn test_envelope_encode_idempotent() {
        let env = Envelope {
            msg_type: MessageType::AuthResult,
            payload: Bytes::from_static(b"payload"),
            request_id: Some(7),
        };
        assert_eq!(env.encode().unwrap(), env.encode().unwrap());
    }

    #[test]
    fn test_envelope_missing_required_fields() {
        // Only a payload field, no type.
        let mut w = BoundedWriter::new(16);
        w.put_bytes_field(2, b"x").unwrap();
        let err = Envelope::decode(&w.finish()).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(m) if m.contains("type")));

        // Only a type field, no payload.
        let mut w = BoundedWriter::new(16);
        w.put_uint_field(1, 1).unwrap();
        let err = Envelope::decode(&w.finish()).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(m) if m.contains("payload")));
    }

    #[test]
    fn test_envelope_unknown_field_ignored() {
        let env = Envelope {
            msg_type: MessageType::ClientHello,
            payload: Bytes::from_static(b"x"),
            request_id: None,
        };
        let mut bytes = env.encode().unwrap().to_vec();
        // Append an unknown varint field with tag 12.
        bytes.extend_from_slice(&[0x60, 0x05]);
        assert_eq!(Envelope::decode(&bytes).unwrap(), env);
    }

    #[test]
    fn test_envelope_out_of_order_fields() {
        // payload before type: both accepted.
        let mut w = BoundedWriter::new(32);
        w.put_bytes_field(2, b"late-type").unwrap();
        w.put_uint_field(1, 3).unwrap();
        let env = Envelope::decode(&w.finish()).unwrap();
        assert_eq!(env.msg_type, MessageType::ClientResponse);
        assert_eq!(&env.payload[..], b"late-type");
    }

    #[test]
    fn test_envelope_unknown_type_rejected() {
        let mut w = BoundedWriter::new(16);
        w.put_uint_field(1, 99).unwrap();
        w.put_bytes_field(2, b"x").unwrap();
        assert!(Envelope::decode(&w.finish()).is_err());
    }

    #[test]
    fn test_envelope_payload_size_boundary() {
        let at_cap = Envelope {
            msg_type: MessageType::RangeProofRequest,
            payload: Bytes::from(vec![0xaa; MAX_PAYLOAD_SIZE]),
            request_id: None,
        };
        let encoded = at_cap.encode().unwrap();
        assert_eq!(Envelope::decode(&encoded).unwrap(), at_cap);

        let over = Envelope {
            msg_type: MessageType::RangeProofRequest,
            payload: Bytes::from(vec![0xaa; MAX_PAYLOAD_SIZE + 1]),
            request_id: None,
        };
        assert!(matches!(over.encode(), Err(ProtocolError::Encode(_))));
    }

    #[test]
    fn test_client_hello_roundtrip() {
        let hello = ClientHello {
            serial_id: "DEMO-SERIAL-0001".into(),
            sig: vec![0xab; 64],
        };
        let encoded = hello.encode().unwrap();
        assert_eq!(ClientHello::decode(&encoded).unwrap(), hello);
    }

    #[test]
    fn test_client_hello_serial_bounds() {
        let empty = ClientHello {
            serial_id: String::new(),
            sig: vec![0; 64],
        };
        assert!(ClientHello::decode(&empty.encode().unwrap()).is_err());

        let at_cap = ClientHello {
            serial_id: "s".repeat(MAX_SERIAL_LEN),
            sig: vec![0; 64],
        };
        assert!(ClientHello::decode(&at_cap.encode().unwrap()).is_ok());

        // Hand-encode an over-long serial; the decoder must reject it.
        let mut w = BoundedWriter::new(256);
        w.put_bytes_field(1, "s".repeat(MAX_SERIAL_LEN + 1).as_bytes())
            .unwrap();
        w.put_bytes_field(2, &[0; 64]).unwrap();
        assert!(ClientHello::decode(&w.finish()).is_err());
    }

    #[test]
    fn test_client_hello_invalid_utf8_rejected() {
        let mut w = BoundedWriter::new(64);
        w.put_bytes_field(1, &[0xff, 0xfe]).unwrap();
        w.put_bytes_field(2, &[0; 64]).unwrap();
        assert!(ClientHello::decode(&w.finish()).is_err());
    }

    #[test]
    fn test_server_challenge_roundtrip() {
        let chall = ServerChallenge {
            nonce: vec![0x5a; 32],
            server_sig: vec![0xc3; 64],
        };
        let encoded = chall.encode().unwrap();
        assert_eq!(ServerChallenge::decode(&encoded).unwrap(), chall);
    }

    #[test]
    fn test_client_response_roundtrip() {
        let resp = ClientResponse { sig: vec![0x77; 64] };
        let encoded = resp.encode().unwrap();
        assert_eq!(ClientResponse::decode(&encoded).unwrap(), resp);
    }

    #[test]
    fn test_auth_result_roundtrip() {
        for result in [
            AuthResult {
                ok: true,
                message: Some("auth ok".into()),
            },
            AuthResult {
                ok: false,
                message: Some("auth failed".into()),
            },
            AuthResult {
                ok: false,
                message: None,
            },
        ] {
            let encoded = result.encode().unwrap();
            assert_eq!(AuthResult::decode(&encoded).unwrap(), result);
        }
    }

    #[test]
    fn test_auth_result_message_truncated_on_encode() {
        let result = AuthResult {
            ok: true,
            message: Some("m".repeat(200)),
        };
        let decoded = AuthResult::decode(&result.encode().unwrap()).unwrap();
        assert_eq!(decoded.message.unwrap().len(), MAX_AUTH_MESSAGE_LEN);
    }

    #[test]
    fn test_auth_result_overlong_message_rejected_on_decode() {
        let mut w = BoundedWriter::new(256);
        w.put_bytes_field(2, "m".repeat(MAX_AUTH_MESSAGE_LEN + 1).as_bytes())
            .unwrap();
        assert!(AuthResult::decode(&w.finish()).is_err());
    }

    #[test]
    fn test_range_proof_request_roundtrip() {
        let req = sample_request();
        let encoded = req.encode().unwrap();
        assert!(encoded.len() <= RANGE_PROOF_REQUEST_MAX_SIZE);
        assert_eq!(RangeProofRequest::decode(&encoded).unwrap(), req);
    }

    #[test]
    fn test_range_proof_request_short_point_rejected() {
        let mut w = BoundedWriter::new(128);
        w.put_bytes_field(4, &[0x02; 32]).unwrap();
        assert!(RangeProofRequest::decode(&w.finish()).is_err());
    }

    #[test]
    fn test_range_proof_request_fifth_commit_rejected() {
        let mut req = sample_request();
        req.lower_commit.push(sample_point(0x50));
        let encoded = req.encode().unwrap();
        let err = RangeProofRequest::decode(&encoded).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(m) if m.contains("lower_commit")));
    }

    #[test]
    fn test_range_proof_request_partial_commits_decode() {
        // Fewer than four points is a verifier concern, not a codec one.
        let mut req = sample_request();
        req.lower_commit.truncate(2);
        let decoded = RangeProofRequest::decode(&req.encode().unwrap()).unwrap();
        assert_eq!(decoded.lower_commit.len(), 2);
    }

    #[test]
    fn test_range_proof_result_roundtrip() {
        let result = RangeProofResult {
            ok: true,
            message: Some("verified range proof for [min=10, max=20], bitlen=5".into()),
        };
        let encoded = result.encode().unwrap();
        assert_eq!(RangeProofResult::decode(&encoded).unwrap(), result);
    }

    #[test]
    fn test_range_proof_result_message_cap() {
        let result = RangeProofResult {
            ok: false,
            message: Some("m".repeat(MAX_PROOF_MESSAGE_LEN)),
        };
        assert!(RangeProofResult::decode(&result.encode().unwrap()).is_ok());

        let mut w = BoundedWriter::new(256);
        w.put_bytes_field(2, "m".repeat(MAX_PROOF_MESSAGE_LEN + 1).as_bytes())
            .unwrap();
        assert!(RangeProofResult::decode(&w.finish()).is_err());
    }
}
