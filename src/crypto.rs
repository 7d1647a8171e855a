//! # Cryptographic Primitives
//!
//! This module provides the cryptographic foundation:
//! - SHA-256 hashing
//! - ECDSA signing and verification over secp256k1 (raw r ∥ s signatures)
//! - Compressed-point decoding and group arithmetic
//! - Scalar arithmetic modulo the group order
//! - Secure random generation
//!
//! ## Security Considerations
//!
//! - Curve-library types never leave this module; the protocol layers see
//!   only byte arrays, [`CurvePoint`] and [`CurveScalar`]
//! - Randomness comes from the OS CSPRNG and failures are propagated, not
//!   papered over
//! - Point and scalar comparisons go through the curve library's
//!   constant-time equality

use std::ops::{Add, Mul, Sub};

use k256::{
    ecdsa::{
        signature::hazmat::{PrehashSigner, PrehashVerifier},
        Signature, SigningKey, VerifyingKey,
    },
    elliptic_curve::{
        ops::Reduce,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Field as _,
    },
    AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256,
};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::{ProtocolError, ProtocolResult};
use crate::{Digest32, Point33, Sig64, PRIV_LEN};

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Sign a precomputed digest, returning the raw 64-byte r ∥ s signature.
pub fn ecdsa_sign_digest(priv32: &[u8; PRIV_LEN], digest: &Digest32) -> ProtocolResult<Sig64> {
    let key = SigningKey::from_slice(priv32)
        .map_err(|e| ProtocolError::Primitive(format!("invalid private key: {e}")))?;
    let sig: Signature = key
        .sign_prehash(digest)
        .map_err(|e| ProtocolError::Primitive(format!("ecdsa signing failed: {e}")))?;
    let bytes = sig.to_bytes();
    let mut out = [0u8; 64];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Verify a raw 64-byte signature over a precomputed digest.
///
/// Any malformed key or signature verifies as false rather than erroring;
/// callers treat the outcome as a single accept/reject bit.
pub fn ecdsa_verify_digest(pub33: &Point33, digest: &Digest32, sig64: &Sig64) -> bool {
    let Ok(key) = VerifyingKey::from_sec1_bytes(pub33) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(sig64) else {
        return false;
    };
    key.verify_prehash(digest, &sig).is_ok()
}

/// Derive the compressed public key for a private scalar.
pub fn pubkey33_from_priv(priv32: &[u8; PRIV_LEN]) -> ProtocolResult<Point33> {
    let key = SigningKey::from_slice(priv32)
        .map_err(|e| ProtocolError::Primitive(format!("invalid private key: {e}")))?;
    let encoded = key.verifying_key().to_encoded_point(true);
    encoded
        .as_bytes()
        .try_into()
        .map_err(|_| ProtocolError::Primitive("unexpected public key encoding".into()))
}

/// A point in the secp256k1 group, kept opaque to the protocol layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint(ProjectivePoint);

impl CurvePoint {
    /// The group identity (point at infinity).
    pub fn identity() -> Self {
        Self(ProjectivePoint::IDENTITY)
    }

    /// The standard generator G.
    pub fn generator() -> Self {
        Self(ProjectivePoint::GENERATOR)
    }

    /// Decode a 33-byte compressed encoding, rejecting anything that is
    /// not a point on the curve.
    pub fn decode(bytes: &Point33) -> ProtocolResult<Self> {
        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|_| ProtocolError::Primitive("invalid compressed point".into()))?;
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or_else(|| ProtocolError::Primitive("invalid compressed point".into()))?;
        Ok(Self(ProjectivePoint::from(affine)))
    }

    /// Encode to the 33-byte compressed form. The identity has no
    /// compressed encoding and is an error.
    pub fn encode(&self) -> ProtocolResult<Point33> {
        if self.0 == ProjectivePoint::IDENTITY {
            return Err(ProtocolError::Primitive(
                "cannot encode the identity point".into(),
            ));
        }
        let encoded = self.0.to_affine().to_encoded_point(true);
        encoded
            .as_bytes()
            .try_into()
            .map_err(|_| ProtocolError::Primitive("unexpected point encoding".into()))
    }

    pub fn add(&self, other: &CurvePoint) -> CurvePoint {
        Self(self.0 + other.0)
    }

    pub fn neg(&self) -> CurvePoint {
        Self(-self.0)
    }
}

/// A scalar modulo the secp256k1 group order n.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveScalar(Scalar);

impl CurveScalar {
    pub fn zero() -> Self {
        Self(Scalar::ZERO)
    }

    /// Lift an unsigned 64-bit value into the scalar field.
    pub fn from_u64(v: u64) -> Self {
        Self(Scalar::from(v))
    }

    /// Interpret 32 big-endian bytes as an integer reduced mod n.
    pub fn reduce_bytes(bytes: &[u8; 32]) -> Self {
        Self(<Scalar as Reduce<U256>>::reduce_bytes(
            FieldBytes::from_slice(bytes),
        ))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero().into()
    }

    /// Compute `self · G`.
    pub fn mul_generator(&self) -> CurvePoint {
        CurvePoint(ProjectivePoint::GENERATOR * self.0)
    }
}

impl Add for CurveScalar {
    type Output = CurveScalar;

    fn add(self, rhs: CurveScalar) -> CurveScalar {
        CurveScalar(self.0 + rhs.0)
    }
}

impl Sub for CurveScalar {
    type Output = CurveScalar;

    fn sub(self, rhs: CurveScalar) -> CurveScalar {
        CurveScalar(self.0 - rhs.0)
    }
}

impl Mul for CurveScalar {
    type Output = CurveScalar;

    fn mul(self, rhs: CurveScalar) -> CurveScalar {
        CurveScalar(self.0 * rhs.0)
    }
}

/// Hash a domain string to a nonzero-by-construction scalar.
pub fn hash_to_scalar(domain: &str) -> CurveScalar {
    CurveScalar::reduce_bytes(&sha256(domain.as_bytes()))
}

/// Fill `buf` with bytes from the OS CSPRNG, propagating source failure.
pub fn random_bytes(buf: &mut [u8]) -> ProtocolResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| ProtocolError::Primitive(format!("os rng failure: {e}")))
}

/// Draw a uniformly random scalar mod n (zero permitted).
pub fn random_scalar() -> ProtocolResult<CurveScalar> {
    let mut bytes = [0u8; 32];
    random_bytes(&mut bytes)?;
    Ok(CurveScalar::reduce_bytes(&bytes))
}

/// Draw a uniformly random nonzero scalar mod n.
pub fn random_scalar_nonzero() -> ProtocolResult<CurveScalar> {
    loop {
        let s = random_scalar()?;
        if !s.is_zero() {
            return Ok(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATOR_HEX: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn priv_scalar(v: u8) -> [u8; 32] {
        let mut p = [0u8; 32];
        p[31] = v;
        p
    }

    fn hex_point(s: &str) -> Point33 {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_sha256_known_vector() {
        let digest = sha256(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let priv32 = priv_scalar(7);
        let pub33 = pubkey33_from_priv(&priv32).unwrap();
        let digest = sha256(b"challenge");

        let sig = ecdsa_sign_digest(&priv32, &digest).unwrap();
        assert!(ecdsa_verify_digest(&pub33, &digest, &sig));

        let other = sha256(b"different");
        assert!(!ecdsa_verify_digest(&pub33, &other, &sig));

        let mut tampered = sig;
        tampered[10] ^= 0x01;
        assert!(!ecdsa_verify_digest(&pub33, &digest, &tampered));
    }

    #[test]
    fn test_zero_signature_rejected() {
        let priv32 = priv_scalar(7);
        let pub33 = pubkey33_from_priv(&priv32).unwrap();
        let digest = sha256(b"anything");
        assert!(!ecdsa_verify_digest(&pub33, &digest, &[0u8; 64]));
    }

    #[test]
    fn test_pubkey_derivation_known_vectors() {
        // priv = 1 gives the generator itself.
        let pub1 = pubkey33_from_priv(&priv_scalar(1)).unwrap();
        assert_eq!(pub1, hex_point(GENERATOR_HEX));

        // priv = 2 gives the demo client key from the registry defaults.
        let pub2 = pubkey33_from_priv(&priv_scalar(2)).unwrap();
        assert_eq!(
            hex::encode(pub2),
            "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5"
        );
    }

    #[test]
    fn test_zero_private_key_rejected() {
        assert!(pubkey33_from_priv(&[0u8; 32]).is_err());
        assert!(ecdsa_sign_digest(&[0u8; 32], &sha256(b"x")).is_err());
    }

    #[test]
    fn test_point_decode_encode_roundtrip() {
        let g = hex_point(GENERATOR_HEX);
        let point = CurvePoint::decode(&g).unwrap();
        assert_eq!(point, CurvePoint::generator());
        assert_eq!(point.encode().unwrap(), g);
    }

    #[test]
    fn test_invalid_point_rejected() {
        // x coordinate above the field prime.
        let mut bad = [0xffu8; 33];
        bad[0] = 0x02;
        assert!(CurvePoint::decode(&bad).is_err());

        // Invalid SEC1 tag.
        let mut bad_tag = hex_point(GENERATOR_HEX);
        bad_tag[0] = 0x05;
        assert!(CurvePoint::decode(&bad_tag).is_err());
    }

    #[test]
    fn test_identity_behavior() {
        let id = CurvePoint::identity();
        assert_ne!(id, CurvePoint::generator());
        assert!(id.encode().is_err());

        // 0·G is the identity.
        assert_eq!(CurveScalar::from_u64(0).mul_generator(), id);

        // P + (−P) is the identity.
        let p = CurveScalar::from_u64(5).mul_generator();
        assert_eq!(p.add(&p.neg()), id);
    }

    #[test]
    fn test_scalar_arithmetic() {
        let a = CurveScalar::from_u64(10);
        let b = CurveScalar::from_u64(3);
        assert_eq!(a + b, CurveScalar::from_u64(13));
        assert_eq!(a - b, CurveScalar::from_u64(7));
        assert_eq!(a * b, CurveScalar::from_u64(30));

        // (a + b)·G == a·G + b·G
        assert_eq!(
            (a + b).mul_generator(),
            a.mul_generator().add(&b.mul_generator())
        );
    }

    #[test]
    fn test_hash_to_scalar_nonzero() {
        assert!(!hash_to_scalar("H").is_zero());
    }

    #[test]
    fn test_random_scalar_nonzero() {
        for _ in 0..8 {
            assert!(!random_scalar_nonzero().unwrap().is_zero());
        }
    }
}
