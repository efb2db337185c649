//! Modular field arithmetic and Shamir secret sharing over a runtime-chosen prime `p < 2^32`.
//!
//! Unlike a statically-generated prime field type (one field per compiled type), every tallier
//! learns its election's prime at election-creation time, so the prime here is a runtime value
//! carried alongside each [`Elem`] rather than baked into the type. Shares travel the wire as
//! `u32` (see the transport crate), so all arithmetic reduces to that width; products are taken
//! in `u64` before reducing mod `p` to stay lossless.

mod error;
mod matrix;
mod lagrange;
mod shamir;
mod sqrt;

pub use error::FieldError;
pub use matrix::{inverse, vandermonde};
pub use lagrange::lagrange_poly;
pub use shamir::{gen_shares, reconstruct};
pub use sqrt::mod_sqrt;

use rand::RngCore;

/// A field element. Always reduced into `[0, p)` for whichever [`Field`] it was produced from.
pub type Elem = u32;

/// The prime field `Z_p` a tallier performs arithmetic in for one election.
///
/// `p` must leave at least one bit of headroom below `2^32`: shares are transmitted as `u32`
/// and products are accumulated in `u64` before reduction, which is lossless for any `p < 2^32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    p: u32,
}

impl Field {
    /// Construct a field over `Z_p`. Rejects `p == 0` and `p >= 2^32` is rejected structurally
    /// because `p` is already typed as `u32`; the remaining precondition is `p > 1`.
    pub fn new(p: u32) -> Result<Field, FieldError> {
        if p < 2 {
            return Err(FieldError::InvalidPrime { p });
        }
        Ok(Field { p })
    }

    pub fn prime(&self) -> u32 {
        self.p
    }

    pub fn zero(&self) -> Elem {
        0
    }

    pub fn one(&self) -> Elem {
        1 % self.p
    }

    pub fn reduce(&self, a: u64) -> Elem {
        (a % self.p as u64) as u32
    }

    pub fn add(&self, a: Elem, b: Elem) -> Elem {
        ((a as u64 + b as u64) % self.p as u64) as u32
    }

    pub fn sub(&self, a: Elem, b: Elem) -> Elem {
        let p = self.p as u64;
        ((a as u64 + p - (b as u64 % p)) % p) as u32
    }

    pub fn neg(&self, a: Elem) -> Elem {
        self.sub(0, a)
    }

    pub fn mul(&self, a: Elem, b: Elem) -> Elem {
        ((a as u64 * b as u64) % self.p as u64) as u32
    }

    /// Exponentiation by repeated squaring. `e` is a plaintext exponent (used for Fermat
    /// primality-adjacent tricks like `is_zero`'s `a^(p-1)`), never a shared value.
    pub fn pow(&self, base: Elem, mut exp: u64) -> Elem {
        let mut result = self.one();
        let mut base = base as u64 % self.p as u64;
        let p = self.p as u64;
        while exp > 0 {
            if exp & 1 == 1 {
                result = ((result as u64 * base) % p) as u32;
            }
            base = (base * base) % p;
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse via Fermat's little theorem (`p` is prime): `a^(p-2) mod p`.
    pub fn inverse(&self, a: Elem) -> Result<Elem, FieldError> {
        if a == 0 {
            return Err(FieldError::NotInvertible);
        }
        Ok(self.pow(a, self.p as u64 - 2))
    }

    /// Inverse of 2 mod p, used throughout `random_bit` and the comparison primitives.
    pub fn inverse_two(&self) -> Elem {
        // infallible: p is an odd prime (or p == 2, in which case 2 == 0 mod p and this field
        // would be unusable for sharing secrets anyway; callers never construct such a field).
        self.inverse(2 % self.p).unwrap_or(0)
    }

    /// Sample a uniform element of `[0, p)`.
    pub fn random_element(&self, rng: &mut dyn RngCore) -> Elem {
        if self.p == 0 {
            return 0;
        }
        // rejection sampling against the next power of two avoids modulo bias
        let bound = self.p;
        let mut mask = u32::MAX;
        if bound != u32::MAX {
            let mut m = bound.next_power_of_two().wrapping_sub(1);
            if m == 0 {
                m = u32::MAX;
            }
            mask = m;
        }
        loop {
            let candidate = rng.next_u32() & mask;
            if candidate < bound {
                return candidate;
            }
        }
    }
}
