//! # Range-Proof Verifier
//!
//! Verifies a four-term commitment range proof: the client claims a secret
//! value v lies in `[min, max]` and submits commitments whose algebraic
//! relations hold exactly when `v − min` and `max − v` are both sums of
//! four squares, i.e. nonnegative. The blinding contributions cancel out
//! of every equality, so the verifier never needs the second base H.

use crate::crypto::{CurvePoint, CurveScalar};
use crate::messages::RangeProofRequest;
use crate::COMMIT_TERMS;

/// Outcome of a proof verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub ok: bool,
    pub message: String,
}

impl Verification {
    fn fail(message: &str) -> Self {
        Self {
            ok: false,
            message: message.to_owned(),
        }
    }
}

fn sum_points(commits: &[[u8; 33]]) -> Option<CurvePoint> {
    let mut acc = CurvePoint::identity();
    for p33 in commits {
        acc = acc.add(&CurvePoint::decode(p33).ok()?);
    }
    Some(acc)
}

/// Run the ordered algebraic checks on a decoded proof request.
///
/// Returns on the first failed check; a failure is a verdict, not a
/// session error.
pub fn verify_range_proof(req: &RangeProofRequest) -> Verification {
    if req.min > req.max {
        return Verification::fail("min > max");
    }
    if req.bitlen == 0 || req.bitlen > 32 {
        return Verification::fail("bitlen must be 1..32 (demo constraint)");
    }

    // Force the range to fit in bitlen. The 64-bit branch is headroom for
    // a wider bitlen; it is unreachable behind the 1..=32 check above.
    let max_allowed = if req.bitlen == 64 {
        u64::MAX
    } else {
        (1u64 << req.bitlen) - 1
    };
    if req.max > max_allowed {
        return Verification::fail("max exceeds 2^bitlen-1");
    }

    if req.lower_commit.len() != COMMIT_TERMS || req.upper_commit.len() != COMMIT_TERMS {
        return Verification::fail("expected exactly 4 lower_commit and 4 upper_commit points");
    }

    let (Ok(c1), Ok(c2)) = (CurvePoint::decode(&req.c1), CurvePoint::decode(&req.c2)) else {
        return Verification::fail("invalid compressed point");
    };

    let Some(sum_lower) = sum_points(&req.lower_commit) else {
        return Verification::fail("invalid compressed point");
    };
    if sum_lower != c2 {
        return Verification::fail("lower_commit sum does not match c2");
    }

    let Some(sum_upper) = sum_points(&req.upper_commit) else {
        return Verification::fail("invalid compressed point");
    };
    if sum_upper != c1 {
        return Verification::fail("upper_commit sum does not match c1");
    }

    // c1 + c2 == (max - min)·G; the r·H terms cancel.
    let width = req.max - req.min;
    let width_g = CurveScalar::from_u64(width).mul_generator();
    if c1.add(&c2) != width_g {
        return Verification::fail("c1 + c2 != (max-min)·G");
    }

    // Redundant cross-check:
    //   p1 = max·G − c1
    //   p2 = c2 + min·G
    let p1 = CurveScalar::from_u64(req.max)
        .mul_generator()
        .add(&c1.neg());
    let p2 = c2.add(&CurveScalar::from_u64(req.min).mul_generator());
    if p1 != p2 {
        return Verification::fail("p1 != p2");
    }

    Verification {
        ok: true,
        message: format!(
            "verified range proof for [min={}, max={}], bitlen={}",
            req.min, req.max, req.bitlen
        ),
    }
}
