//! Shamir secret sharing: share generation and Lagrange reconstruction at `x = 0`.
//!
//! A degree-`(t-1)` random polynomial evaluated at `1..=D`, reconstructed via Lagrange
//! interpolation at `0`; arithmetic runs over the runtime-chosen `Field` (see `tallier-field::lib`)
//! rather than a fixed-width big-integer type.

use rand::RngCore;

use crate::{Elem, Field, FieldError};

/// Sample a degree-`(threshold - 1)` polynomial `f` with `f(0) = secret` and return
/// `(f(1), f(2), .., f(count))` as the `count` shares.
///
/// `threshold` is the number of shares later required to reconstruct the secret; it need not
/// equal the tallier clique size `D` (the rnd-multiply protocol shares at both `t` and `2t-1`
/// degree against the same `D`-party clique).
pub fn gen_shares(
    field: &Field,
    secret: Elem,
    count: usize,
    threshold: usize,
) -> Vec<Elem> {
    gen_shares_with_rng(field, secret, count, threshold, &mut rand::thread_rng())
}

/// As [`gen_shares`], but with an explicit RNG (used by tests and by callers that already hold
/// a CSPRNG handle to avoid re-seeding one per call).
pub fn gen_shares_with_rng(
    field: &Field,
    secret: Elem,
    count: usize,
    threshold: usize,
    rng: &mut dyn RngCore,
) -> Vec<Elem> {
    assert!(threshold >= 1, "threshold must be at least 1");

    let coefficients: Vec<Elem> = (1..threshold).map(|_| field.random_element(rng)).collect();

    (1..=count as u32)
        .map(|x| {
            let mut acc = secret;
            let mut power = x;
            for coeff in &coefficients {
                acc = field.add(acc, field.mul(*coeff, power));
                power = field.mul(power, x);
            }
            acc
        })
        .collect()
}

/// Reconstruct the secret `f(0)` via Lagrange interpolation from `(x_j, y_j)` points.
///
/// Fails if fewer than `threshold` points are given, or if two points share an `x` coordinate.
/// `threshold` bounds how many of `points` are actually consumed (extra points are ignored,
/// mirroring the source's `reconstruct_secret(shares, threshold)` taking a possibly-larger
/// share list).
pub fn reconstruct(
    field: &Field,
    points: &[(u32, Elem)],
    threshold: usize,
) -> Result<Elem, FieldError> {
    if points.len() < threshold {
        return Err(FieldError::InsufficientShares {
            needed: threshold,
            got: points.len(),
        });
    }

    let used = &points[..threshold];
    for (i, (xi, _)) in used.iter().enumerate() {
        for (xj, _) in used[..i].iter() {
            if xi == xj {
                return Err(FieldError::DuplicateEvaluationPoint { x: *xi });
            }
        }
    }

    let mut secret = field.zero();
    for (i, (xi, yi)) in used.iter().enumerate() {
        let mut term = *yi;
        for (j, (xj, _)) in used.iter().enumerate() {
            if i == j {
                continue;
            }
            // basis_ij = (0 - xj) / (xi - xj) = (-xj) * (xi - xj)^-1
            let numerator = field.neg(*xj);
            let denominator = field.sub(*xi, *xj);
            let inv = field.inverse(denominator)?;
            term = field.mul(term, field.mul(numerator, inv));
        }
        secret = field.add(secret, term);
    }

    Ok(secret)
}
