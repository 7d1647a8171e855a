//! # Range-Proof Construction
//!
//! Builds the commitment layout the verifier checks: `v − min` and
//! `max − v` are decomposed into four squares, each square committed
//! individually with blinding shares that sum to a common blinding
//! scalar, so the shares cancel inside every verified equality.

use rand::{rngs::OsRng, Rng};

use crate::crypto::{hash_to_scalar, random_scalar, random_scalar_nonzero, CurveScalar};
use crate::error::{ProtocolError, ProtocolResult};
use crate::messages::RangeProofRequest;
use crate::COMMIT_TERMS;

fn isqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).map_or(true, |sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

/// Decompose `n` into four squares: `n = a² + b² + c² + d²`.
///
/// Random sampling finds a decomposition quickly for the 32-bit values
/// this protocol commits to; an exhaustive scan guarantees termination.
pub fn four_squares(n: u64) -> [u64; 4] {
    if n == 0 {
        return [0, 0, 0, 0];
    }

    let limit = isqrt(n);
    let squares: Vec<u64> = (0..=limit).map(|i| i * i).collect();
    let root_of = |square: u64| -> Option<u64> {
        squares.binary_search(&square).ok().map(|i| i as u64)
    };

    let two_squares = |m: u64| -> Option<(u64, u64)> {
        for a in 0..=isqrt(m) {
            if let Some(b) = root_of(m - a * a) {
                return Some((a, b));
            }
        }
        None
    };

    const MAX_ATTEMPTS: usize = 20_000;
    for _ in 0..MAX_ATTEMPTS {
        let a = OsRng.gen_range(0..=limit);
        let b = OsRng.gen_range(0..=limit);
        let Some(r1) = n.checked_sub(a * a + b * b) else {
            continue;
        };
        if let Some((c, d)) = two_squares(r1) {
            return [a, b, c, d];
        }
    }

    // Deterministic fallback; Lagrange guarantees a decomposition exists.
    for a in 0..=limit {
        let r0 = n - a * a;
        for b in 0..=isqrt(r0) {
            if let Some((c, d)) = two_squares(r0 - b * b) {
                return [a, b, c, d];
            }
        }
    }
    unreachable!("four-square decomposition exists for every nonnegative integer")
}

fn sum(parts: &[CurveScalar]) -> CurveScalar {
    parts
        .iter()
        .fold(CurveScalar::zero(), |acc, p| acc + *p)
}

fn blinding_shares(total: CurveScalar) -> ProtocolResult<[CurveScalar; COMMIT_TERMS]> {
    let mut shares = [CurveScalar::zero(); COMMIT_TERMS];
    for share in shares.iter_mut().take(COMMIT_TERMS - 1) {
        *share = random_scalar()?;
    }
    shares[COMMIT_TERMS - 1] = total - sum(&shares[..COMMIT_TERMS - 1]);
    Ok(shares)
}

/// Build a range proof that `value` lies in `[min, max]`.
pub fn build_range_proof(
    min: u64,
    max: u64,
    bitlen: u32,
    value: u64,
) -> ProtocolResult<RangeProofRequest> {
    if min > max {
        return Err(ProtocolError::Protocol("min > max".into()));
    }
    if value < min || value > max {
        return Err(ProtocolError::Protocol("value not in [min, max]".into()));
    }
    if bitlen == 0 || bitlen > 32 {
        return Err(ProtocolError::Protocol("bitlen must be 1..32".into()));
    }
    if max > (1u64 << bitlen) - 1 {
        return Err(ProtocolError::Protocol("max exceeds 2^bitlen-1".into()));
    }

    let w = value - min;
    let t = max - value;
    let s = four_squares(w);
    let u = four_squares(t);

    let h = hash_to_scalar("H");

    loop {
        let r = random_scalar_nonzero()?;
        let r_parts = blinding_shares(r)?;
        let u_parts = blinding_shares(r)?;

        let lower_scalars: Vec<CurveScalar> = (0..COMMIT_TERMS)
            .map(|i| CurveScalar::from_u64(s[i] * s[i]) + r_parts[i] * h)
            .collect();
        let upper_scalars: Vec<CurveScalar> = (0..COMMIT_TERMS)
            .map(|i| CurveScalar::from_u64(u[i] * u[i]) - u_parts[i] * h)
            .collect();

        let c2_scalar = CurveScalar::from_u64(w) + r * h;
        let c1_scalar = CurveScalar::from_u64(t) - r * h;

        // A zero scalar would commit to the identity, which has no
        // compressed encoding; redraw the blinding in that case.
        let all_nonzero = !c1_scalar.is_zero()
            && !c2_scalar.is_zero()
            && lower_scalars.iter().all(|k| !k.is_zero())
            && upper_scalars.iter().all(|k| !k.is_zero());
        if !all_nonzero {
            continue;
        }

        if sum(&lower_scalars) != c2_scalar || sum(&upper_scalars) != c1_scalar {
            continue;
        }

        let mut lower_commit = Vec::with_capacity(COMMIT_TERMS);
        for k in &lower_scalars {
            lower_commit.push(k.mul_generator().encode()?);
        }
        let mut upper_commit = Vec::with_capacity(COMMIT_TERMS);
        for k in &upper_scalars {
            upper_commit.push(k.mul_generator().encode()?);
        }

        return Ok(RangeProofRequest {
            min,
            max,
            bitlen,
            c1: c1_scalar.mul_generator().encode()?,
            c2: c2_scalar.mul_generator().encode()?,
            lower_commit,
            upper_commit,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::verify_range_proof;

    #[test]
    fn test_isqrt() {
        for (n, expected) in [(0u64, 0u64), (1, 1), (3, 1), (4, 2), (15, 3), (16, 4)] {
            assert_eq!(isqrt(n), expected);
        }
        assert_eq!(isqrt(u32::MAX as u64), 65535);
    }

    #[test]
    fn test_four_squares_sums() {
        for n in [0u64, 1, 2, 3, 7, 12, 31, 255, 12345, 999_983, u32::MAX as u64] {
            let [a, b, c, d] = four_squares(n);
            assert_eq!(a * a + b * b + c * c + d * d, n, "decomposition of {n}");
        }
    }

    #[test]
    fn test_build_rejects_bad_parameters() {
        assert!(build_range_proof(20, 10, 5, 15).is_err());
        assert!(build_range_proof(10, 20, 5, 9).is_err());
        assert!(build_range_proof(10, 20, 5, 21).is_err());
        assert!(build_range_proof(10, 20, 0, 15).is_err());
        assert!(build_range_proof(10, 20, 33, 15).is_err());
        assert!(build_range_proof(0, 32, 5, 15).is_err());
    }

    #[test]
    fn test_built_proofs_verify() {
        for (min, max, bitlen, value) in [
            (10u64, 20u64, 5u32, 10u64),
            (10, 20, 5, 20),
            (0, 31, 5, 17),
            (1000, 2000, 11, 1500),
        ] {
            let req = build_range_proof(min, max, bitlen, value).unwrap();
            let verdict = verify_range_proof(&req);
            assert!(verdict.ok, "{}: {}", value, verdict.message);
        }
    }

    #[test]
    fn test_commit_vectors_are_full() {
        let req = build_range_proof(0, 15, 4, 9).unwrap();
        assert_eq!(req.lower_commit.len(), COMMIT_TERMS);
        assert_eq!(req.upper_commit.len(), COMMIT_TERMS);
    }
}
