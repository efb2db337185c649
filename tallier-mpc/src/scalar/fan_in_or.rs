//! Fan-in OR of `n` shared bits in a single expression (spec §4.D `fan_in_or`): instead of a
//! chain of pairwise ORs (`n-1` sequential rounds), compute `A = 1 + sum(bits)` and interpolate
//! the unique low-degree polynomial through `(0,0), (1,1), (2,1), .., (n,1)`, then evaluate it at
//! the shared point `A` using only `n-1` multiplications (computing the powers `A^2 .. A^n`).

use std::sync::Mutex;

use lru::LruCache;
use once_cell::sync::Lazy;
use tallier_field::{Elem, Field};

use super::Mpc;
use crate::error::MpcError;

/// Coefficients are pure functions of `(p, n)`; callers within one process repeatedly hit the
/// same `n` (ballot widths recur across elections sharing the same field), so cache them.
static COEFFICIENT_CACHE: Lazy<Mutex<LruCache<(u32, usize), Vec<Elem>>>> =
    Lazy::new(|| Mutex::new(LruCache::new(std::num::NonZeroUsize::new(64).unwrap())));

/// The coefficients `c_0..c_n` of the degree-`n` polynomial `P` with `P(0) = 0` and
/// `P(k) = 1` for `k = 1..=n`, ascending by power of `x`.
pub fn fan_in_or_coefficients(field: &Field, n: usize) -> Vec<Elem> {
    let key = (field.prime(), n);
    if let Some(hit) = COEFFICIENT_CACHE.lock().unwrap().get(&key) {
        return hit.clone();
    }

    let mut points = Vec::with_capacity(n + 1);
    points.push((0u32, field.zero()));
    for k in 1..=n as u32 {
        points.push((k, field.one()));
    }
    let coefficients = tallier_field::lagrange_poly(field, &points);

    COEFFICIENT_CACHE.lock().unwrap().put(key, coefficients.clone());
    coefficients
}

impl Mpc {
    /// OR of `bits`, each a share of 0 or 1. Uses `n-1` sequential multiplications to build the
    /// powers of `A = 1 + sum(bits)`; each multiplication is a full `rnd_multiply`, so reserve
    /// `(n-1) * 4` msgids starting at `msgid` (well within one `block_size` slot for realistic
    /// ballot widths).
    pub async fn fan_in_or(&self, msgid: u32, bits: &[Elem]) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let n = bits.len();
        if n == 0 {
            return Ok(field.zero());
        }

        let sum = bits.iter().fold(field.zero(), |acc, x| field.add(acc, *x));
        let a = field.add(field.one(), sum);

        let mut powers = Vec::with_capacity(n + 1);
        powers.push(field.one()); // A^0
        powers.push(a); // A^1, no communication needed

        let mut step_msgid = msgid;
        for k in 2..=n {
            let next = self.multiply(step_msgid, powers[k - 1], a).await?;
            powers.push(next);
            step_msgid += 4;
        }

        let coefficients = fan_in_or_coefficients(&field, n);
        let mut result = field.zero();
        for (c, p) in coefficients.iter().zip(powers.iter()) {
            result = field.add(result, field.mul(*c, *p));
        }
        Ok(result)
    }
}
