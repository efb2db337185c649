//! Tonelli-Shanks modular square root, used by `random_bit` (§4.D) to turn a random shared
//! square into a random shared bit.

use crate::{Elem, Field};

/// Return some `r` with `r^2 == a (mod p)`, or `0` if `a` is a quadratic non-residue.
///
/// `random_bit` treats the `0` result as `QuadraticNonResidue` (spec §7): not an error, just a
/// signal to resample and retry.
pub fn mod_sqrt(field: &Field, a: Elem) -> Elem {
    let p = field.prime() as u64;
    if a == 0 {
        return 0;
    }
    if p == 2 {
        return a;
    }
    if legendre(field, a) != 1 {
        return 0;
    }

    // p = 3 mod 4: closed form r = a^((p+1)/4)
    if p % 4 == 3 {
        return field.pow(a, (p + 1) / 4);
    }

    // general Tonelli-Shanks
    let mut q = p - 1;
    let mut s = 0u64;
    while q % 2 == 0 {
        q /= 2;
        s += 1;
    }

    let non_residue = (2..p)
        .find(|&n| legendre(field, n as u32) == p as i64 - 1)
        .expect("a prime p > 2 always has a quadratic non-residue below it");

    let mut m = s;
    let mut c = field.pow(non_residue as u32, q);
    let mut t = field.pow(a, q);
    let mut r = field.pow(a, (q + 1) / 2);

    while t != 1 {
        // find least i, 0 < i < m, such that t^(2^i) == 1
        let mut i = 1u64;
        let mut t2i = field.mul(t, t);
        while t2i != 1 {
            t2i = field.mul(t2i, t2i);
            i += 1;
            assert!(i < m, "tonelli-shanks failed to converge for a quadratic residue");
        }

        let b = field.pow(c, 1u64 << (m - i - 1));
        m = i;
        c = field.mul(b, b);
        t = field.mul(t, c);
        r = field.mul(r, b);
    }

    r
}

/// Legendre symbol `a^((p-1)/2) mod p`, returning `1`, `p-1` (i.e. `-1`), or `0`.
fn legendre(field: &Field, a: Elem) -> i64 {
    if a == 0 {
        return 0;
    }
    let p = field.prime() as u64;
    field.pow(a, (p - 1) / 2) as i64
}
