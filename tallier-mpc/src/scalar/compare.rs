//! Bitwise comparison primitives (spec §4.D): `xor`, `prefix_or`, `random_number_bits`,
//! `is_odd`, `less_bitwise`, `less_middle`, and `less`. Built on the classic
//! Damgard-et-al `O(sqrt n)`-round prefix-OR protocol, with the bitwise building blocks
//! (joint random bits, unbounded OR) expressed over this crate's field-element wire
//! representation.

use tallier_field::Elem;

use super::Mpc;
use crate::error::MpcError;

/// Generous, non-tight msgid stride reserved per internal parallel batch of a `prefix_or` call,
/// scaled by `n` so that arbitrarily many nested `fan_in_or`/`multiply` sub-calls (each of which
/// itself reserves `O(n)` msgids) never collide.
fn stride(n: usize) -> u32 {
    ((n as u32) + 8) * 16
}

impl Mpc {
    /// XOR of two shared bits: `a + b - 2ab`. One multiplication.
    pub async fn xor(&self, msgid: u32, a: Elem, b: Elem) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let ab = self.multiply(msgid, a, b).await?;
        Ok(field.sub(field.add(a, b), field.add(ab, ab)))
    }

    /// The bitwise-OR of two shared bits: `a + b - ab`.
    async fn bit_or(&self, msgid: u32, a: Elem, b: Elem) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let ab = self.multiply(msgid, a, b).await?;
        Ok(field.sub(field.add(a, b), ab))
    }

    /// Prefix-OR of `n` shared bits in `O(sqrt n)` rounds (spec §4.D): `out[k] = OR(bits[0..=k])`.
    /// Splits `bits` into `s = ceil(sqrt(n))` blocks of `s`, computes per-block ORs, the
    /// running OR of those block-ORs, uses the "first flipped block" indicator to zero out every
    /// block but the one where the prefix first goes to 1, sums column-wise, takes the
    /// within-that-block prefix OR, and recombines with the carried-in OR of all earlier blocks.
    pub async fn prefix_or(&self, msgid: u32, bits: &[Elem]) -> Result<Vec<Elem>, MpcError> {
        let field = self.params.field;
        let n = bits.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let s = (n as f64).sqrt().ceil() as usize;
        let mut padded = bits.to_vec();
        padded.resize(s * s, field.zero());

        let block_stride = stride(s);

        // x_i = OR of block i, in parallel.
        let x_futures = padded.chunks(s).enumerate().map(|(i, block)| {
            let block = block.to_vec();
            let base = msgid + (i as u32) * block_stride;
            async move { self.fan_in_or(base, &block).await }
        });
        let x: Vec<Elem> = futures::future::try_join_all(x_futures).await?;

        // y_i = OR(x_0..=x_i), each computed independently in parallel.
        let y_base = msgid + (s as u32) * block_stride;
        let y_futures = (0..s).map(|i| {
            let prefix = x[..=i].to_vec();
            let base = y_base + (i as u32) * block_stride;
            async move { self.fan_in_or(base, &prefix).await }
        });
        let y: Vec<Elem> = futures::future::try_join_all(y_futures).await?;

        // f_i = y_i - y_{i-1}: the indicator of the block where the running OR first turns 1.
        let mut f = Vec::with_capacity(s);
        let mut prev = field.zero();
        for yi in &y {
            f.push(field.sub(*yi, prev));
            prev = *yi;
        }

        // g_ij = f_i * a_ij: zero out every block except the flip block.
        let g_base = y_base + (s as u32) * block_stride;
        let g_futures = (0..s).flat_map(|i| {
            (0..s).map(move |j| {
                let base = g_base + ((i * s + j) as u32) * 4;
                let fi = f[i];
                let aij = padded[i * s + j];
                async move { self.multiply(base, fi, aij).await }
            })
        });
        let g: Vec<Elem> = futures::future::try_join_all(g_futures).await?;

        // c_j = sum over blocks i of g_ij: a purely local column sum.
        let mut c = vec![field.zero(); s];
        for i in 0..s {
            for j in 0..s {
                c[j] = field.add(c[j], g[i * s + j]);
            }
        }

        // h_j = OR(c_0..=c_j): the within-flip-block prefix OR.
        let h_base = g_base + ((s * s) as u32) * 4 + block_stride;
        let h_futures = (0..s).map(|j| {
            let prefix = c[..=j].to_vec();
            let base = h_base + (j as u32) * block_stride;
            async move { self.fan_in_or(base, &prefix).await }
        });
        let h: Vec<Elem> = futures::future::try_join_all(h_futures).await?;

        // out[i*s+j] = OR(y_{i-1}, h_j): OR the carried-in prefix with the within-block prefix.
        let or_base = h_base + (s as u32) * block_stride;
        let mut out_futures = Vec::with_capacity(n);
        for i in 0..s {
            let y_prev = if i == 0 { field.zero() } else { y[i - 1] };
            for j in 0..s {
                let idx = i * s + j;
                if idx >= n {
                    break;
                }
                let base = or_base + (idx as u32) * 4;
                let hj = h[j];
                out_futures.push(async move { self.bit_or(base, y_prev, hj).await });
            }
        }
        futures::future::try_join_all(out_futures).await
    }

    /// A jointly-random shared value in `[0, 2^bits)`, as `bits` independently-generated random
    /// bits (spec §4.D `random_number_bits`); returns `(value, little_endian_bit_shares)`.
    pub async fn random_number_bits(&self, msgid: u32, bits: usize) -> Result<(Elem, Vec<Elem>), MpcError> {
        let field = self.params.field;
        let bit_futures = (0..bits).map(|i| {
            let base = msgid + (i as u32) * self.params.block_size;
            async move { self.random_bit(base).await }
        });
        let shares: Vec<Elem> = futures::future::try_join_all(bit_futures).await?;

        let mut value = field.zero();
        for (i, bit) in shares.iter().enumerate() {
            let weight = field.pow(2, i as u64);
            value = field.add(value, field.mul(*bit, weight));
        }
        Ok((value, shares))
    }

    /// Whether a shared value's bit decomposition is odd, i.e. its least-significant bit.
    pub async fn is_odd(&self, msgid: u32, a: Elem, bit_width: usize) -> Result<Elem, MpcError> {
        let bits = self.bit_decompose(msgid, a, bit_width).await?;
        Ok(bits[0])
    }

    /// Decompose a shared value into `bit_width` shared bits (little-endian), via `random_bits`
    /// masking and a `resolve` of the masked value, following the standard
    /// share-conversion technique: mask `a` with a random value whose bits are already shared,
    /// open `a + r` in the clear, then locally combine the clear bits of `a + r` with the shared
    /// bits of `r` using `less_bitwise`'s borrow-propagation to recover the bits of `a`.
    pub(super) async fn bit_decompose(&self, msgid: u32, a: Elem, bit_width: usize) -> Result<Vec<Elem>, MpcError> {
        let field = self.params.field;
        let (r, r_bits) = self.random_number_bits(msgid, bit_width).await?;
        let masked = self
            .resolve(msgid + (bit_width as u32) * self.params.block_size, field.add(a, r))
            .await?;
        let masked_bits = to_bits(masked, bit_width);

        self.less_bitwise_borrow(
            msgid + (bit_width as u32) * self.params.block_size + 1,
            &masked_bits,
            &r_bits,
        )
        .await
    }

    /// Given the clear bits of `masked = a + r` and the shared bits of `r`, recover the shared
    /// bits of `a` by subtracting with borrow, bit by bit, from the least significant bit up.
    async fn less_bitwise_borrow(&self, msgid: u32, masked_bits: &[Elem], r_bits: &[Elem]) -> Result<Vec<Elem>, MpcError> {
        let field = self.params.field;
        let mut result = Vec::with_capacity(masked_bits.len());
        let mut borrow = field.zero();
        for (i, (&m, &r)) in masked_bits.iter().zip(r_bits.iter()).enumerate() {
            let base = msgid + (i as u32) * 24;
            // a_i = m XOR r XOR borrow; new_borrow = (1-m)*r OR (1-m)*borrow OR r*borrow, all
            // computed with the same shared-bit arithmetic used elsewhere in this module.
            let mr = field.mul(m, r);
            let m_xor_r = field.sub(field.add(m, r), field.add(mr, mr));
            let bit = self.xor(base, m_xor_r, borrow).await?;

            let not_m = field.sub(field.one(), m);
            let t1 = self.multiply(base + 4, not_m, r).await?;
            let t2 = self.multiply(base + 8, not_m, borrow).await?;
            let t3 = self.multiply(base + 12, r, borrow).await?;
            let new_borrow = self.fan_in_or(base + 16, &[t1, t2, t3]).await?;

            result.push(bit);
            borrow = new_borrow;
        }
        Ok(result)
    }

    /// Bitwise less-than of two public-length shared bit vectors (MSB first), spec §4.D
    /// `less_bitwise`: prefix-OR of the bitwise difference locates the highest bit where they
    /// differ, and the result is whichever side is 0 there.
    pub async fn less_bitwise(&self, msgid: u32, a_bits: &[Elem], b_bits: &[Elem]) -> Result<Elem, MpcError> {
        let field = self.params.field;
        debug_assert_eq!(a_bits.len(), b_bits.len());
        let n = a_bits.len();

        // `prefix_or`'s internal fan-out can consume far more than `4*n` msgids (each block-OR
        // and recombination step reserves its own `stride(s)`-wide slot), so the three stages
        // below each get a generous, widely-separated base instead of packing tightly.
        let stage_width = stride(n) * (n as u32 + 8);
        let diff_base = msgid;
        let prefix_base = msgid + stage_width;
        let combine_base = msgid + 2 * stage_width;

        let diff_futures = a_bits.iter().zip(b_bits.iter()).enumerate().map(|(i, (&a, &b))| {
            let base = diff_base + (i as u32) * 4;
            async move { self.xor(base, a, b).await }
        });
        let diff: Vec<Elem> = futures::future::try_join_all(diff_futures).await?;

        // prefix OR from the most-significant bit down
        let mut reversed = diff.clone();
        reversed.reverse();
        let prefix = self.prefix_or(prefix_base, &reversed).await?;
        let mut e = prefix;
        e.reverse();

        // the "first differing bit" indicator: e[i] - e[i+1] (e[n] implicitly 0)
        let mut first_diff = Vec::with_capacity(n);
        for i in 0..n {
            let next = if i + 1 < n { e[i + 1] } else { field.zero() };
            first_diff.push(field.sub(e[i], next));
        }

        // result = sum_i first_diff[i] * b_bits[i]
        let mut result = field.zero();
        for i in 0..n {
            let base = combine_base + (i as u32) * 4;
            let term = self.multiply(base, first_diff[i], b_bits[i]).await?;
            result = field.add(result, term);
        }
        Ok(result)
    }

    /// "Is `a` (read as a centered integer in `[-(p-1)/2, (p-1)/2]`) non-negative" (spec §4.D
    /// `less_middle`): `1 - is_odd(2a)`. Distinct from `is_positive`, which is strict (`a > 0`)
    /// and flips at the opposite side of zero; `less` combines three calls to this non-negative
    /// predicate (over `a`, `b`, and `a-b`) into a full comparison, the standard trick for
    /// comparing two centered values without ever bit-decomposing a length longer than
    /// `bit_width`.
    pub async fn less_middle(&self, msgid: u32, a: Elem, bit_width: usize) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let two_a = field.add(a, a);
        let odd = self.is_odd(msgid, two_a, bit_width).await?;
        Ok(field.sub(field.one(), odd))
    }

    /// `a < b` for two shared field elements, read as centered integers (spec §4.D `less`):
    /// combine `less_middle(a)`, `less_middle(b)`, and `less_middle(a-b)` via
    /// `w*(d-c) + 1-d` where `c = x*y`, `d = x+y-c` (`x`, `y` the latter two half-plane bits) —
    /// the classic three-term construction for comparing two half-plane memberships.
    pub async fn less(&self, msgid: u32, a: Elem, b: Elem, bit_width: usize) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let gap = self.params.block_size * (bit_width as u32 + 4);

        let (w, x, y) = tokio::try_join!(
            self.less_middle(msgid, a, bit_width),
            self.less_middle(msgid + gap, b, bit_width),
            self.less_middle(msgid + 2 * gap, field.sub(a, b), bit_width),
        )?;

        let c = self.multiply(msgid + 3 * gap, x, y).await?;
        let d = field.sub(field.add(x, y), c);
        let term = self.multiply(msgid + 4 * gap, w, field.sub(d, c)).await?;
        Ok(field.add(term, field.sub(field.one(), d)))
    }
}

fn to_bits(value: Elem, bits: usize) -> Vec<Elem> {
    (0..bits).map(|i| (value >> i) & 1).collect()
}

#[cfg(test)]
mod tests {
    use tallier_field::Field;

    use super::*;
    use crate::test_support::{open_all, wire_clique};

    #[tokio::test]
    async fn xor_matches_truth_table() {
        let field = Field::new(101).unwrap();
        let d = 5;
        for (bit_a, bit_b, expected) in [(0u32, 0u32, 0u32), (0, 1, 1), (1, 0, 1), (1, 1, 0)] {
            let parties = wire_clique(field, d);
            let t = parties[0].params.t;
            let a_shares = tallier_field::gen_shares(&field, bit_a, d, t);
            let b_shares = tallier_field::gen_shares(&field, bit_b, d, t);
            let futures = parties.iter().enumerate().map(|(i, mpc)| mpc.xor(0, a_shares[i], b_shares[i]));
            let results = futures::future::try_join_all(futures).await.unwrap();
            assert_eq!(open_all(&field, &parties, results).await, expected);
        }
    }

    #[tokio::test]
    async fn prefix_or_accumulates_left_to_right() {
        let field = Field::new(101).unwrap();
        let d = 5;
        let parties = wire_clique(field, d);
        let t = parties[0].params.t;

        let bits = [0u32, 0, 1, 0, 1];
        let bit_shares: Vec<Vec<Elem>> = bits.iter().map(|b| tallier_field::gen_shares(&field, *b, d, t)).collect();

        let futures = parties.iter().enumerate().map(|(i, mpc)| {
            let my_bits: Vec<Elem> = bit_shares.iter().map(|s| s[i]).collect();
            async move { mpc.prefix_or(0, &my_bits).await }
        });
        let results = futures::future::try_join_all(futures).await.unwrap();

        let mut opened = Vec::with_capacity(bits.len());
        for k in 0..bits.len() {
            let column: Vec<Elem> = results.iter().map(|r| r[k]).collect();
            opened.push(open_all(&field, &parties, column).await);
        }
        assert_eq!(opened, vec![0, 0, 1, 1, 1]);
    }

    #[tokio::test]
    async fn less_bitwise_orders_small_numbers() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 5;
        let t = 3;

        for (a, b, expected) in [(3u32, 5u32, 1u32), (5, 3, 0), (4, 4, 0)] {
            let parties = wire_clique(field, d);
            let width = 4;
            let a_bits: Vec<Elem> = to_bits(a, width).into_iter().rev().collect();
            let b_bits: Vec<Elem> = to_bits(b, width).into_iter().rev().collect();

            let a_bit_shares: Vec<Vec<Elem>> = a_bits.iter().map(|bit| tallier_field::gen_shares(&field, *bit, d, t)).collect();
            let b_bit_shares: Vec<Vec<Elem>> = b_bits.iter().map(|bit| tallier_field::gen_shares(&field, *bit, d, t)).collect();

            let futures = parties.iter().enumerate().map(|(i, mpc)| {
                let my_a: Vec<Elem> = a_bit_shares.iter().map(|s| s[i]).collect();
                let my_b: Vec<Elem> = b_bit_shares.iter().map(|s| s[i]).collect();
                async move { mpc.less_bitwise(0, &my_a, &my_b).await }
            });
            let results = futures::future::try_join_all(futures).await.unwrap();
            assert_eq!(open_all(&field, &parties, results).await, expected);
        }
    }
}
