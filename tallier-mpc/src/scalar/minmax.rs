//! `min`, `max`, `is_zero`, and `is_positive` (spec §4.D). `min`/`max` are built on top of
//! `less`; a `resolve`d clear value is itself a valid degree-0 Shamir sharing, so the pairwise
//! tournament in `tournament.rs` can feed these results straight back into further arithmetic.

use tallier_field::Elem;

use super::Mpc;
use crate::error::MpcError;

impl Mpc {
    /// `min(a, b) = b + (a<b)*(a-b)`. One `less` call plus one multiplication.
    pub async fn min(&self, msgid: u32, a: Elem, b: Elem, bit_width: usize) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let gap = self.params.block_size * (bit_width as u32 * 4 + 4);
        let lt = self.less(msgid, a, b, bit_width).await?;
        let diff = field.sub(a, b);
        let term = self.multiply(msgid + gap, lt, diff).await?;
        Ok(field.add(b, term))
    }

    /// `max(a, b) = a + (a<b)*(b-a)`.
    pub async fn max(&self, msgid: u32, a: Elem, b: Elem, bit_width: usize) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let gap = self.params.block_size * (bit_width as u32 * 4 + 4);
        let lt = self.less(msgid, a, b, bit_width).await?;
        let diff = field.sub(b, a);
        let term = self.multiply(msgid + gap, lt, diff).await?;
        Ok(field.add(a, term))
    }

    /// Whether a shared value is zero: mask it with a jointly-random nonzero value and open the
    /// product. `r*a == 0` in a field with `r != 0` iff `a == 0`. The opened product is public,
    /// so the 0/1 result returned here is a trivial (degree-0) share, usable directly by any
    /// further arithmetic on this clique.
    pub async fn is_zero(&self, msgid: u32, a: Elem) -> Result<Elem, MpcError> {
        let r = self.random_number(msgid).await?;
        let product = self.multiply(msgid + self.params.block_size, r, a).await?;
        let opened = self.resolve(msgid + 2 * self.params.block_size, product).await?;
        Ok(if opened == 0 { 1 } else { 0 })
    }

    /// Whether a shared value, read as a centered integer in `[-(p-1)/2, (p-1)/2]`, is strictly
    /// positive (spec §4.D `is_positive`): `is_odd(-2a)`. Doubling and negating `a` before taking
    /// the parity flips exactly at the strictly-positive/non-positive boundary of the centered
    /// range, unlike `less_middle`'s non-negative predicate, which flips at zero itself.
    pub async fn is_positive(&self, msgid: u32, a: Elem, bit_width: usize) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let neg_two_a = field.neg(field.add(a, a));
        self.is_odd(msgid, neg_two_a, bit_width).await
    }
}

#[cfg(test)]
mod tests {
    use tallier_field::Field;

    use super::*;
    use crate::test_support::{open_all, wire_clique};

    #[tokio::test]
    async fn is_zero_detects_zero_and_nonzero() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 5;
        let t = 3;

        for (secret, expected) in [(0u32, 1u32), (17, 0)] {
            let parties = wire_clique(field, d);
            let shares = tallier_field::gen_shares(&field, secret, d, t);
            let futures = parties.iter().enumerate().map(|(i, mpc)| mpc.is_zero(0, shares[i]));
            let results = futures::future::try_join_all(futures).await.unwrap();
            for r in &results {
                assert_eq!(*r, expected);
            }
        }
    }

    #[tokio::test]
    async fn is_positive_is_strict_at_zero() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 5;
        let t = 3;
        let width = 32;

        for (secret, expected) in [(0u32, 0u32), (5, 1), (field.neg(5), 0)] {
            let parties = wire_clique(field, d);
            let shares = tallier_field::gen_shares(&field, secret, d, t);
            let futures = parties.iter().enumerate().map(|(i, mpc)| mpc.is_positive(0, shares[i], width));
            let results = futures::future::try_join_all(futures).await.unwrap();
            assert_eq!(open_all(&field, &parties, results).await, expected);
        }
    }

    #[tokio::test]
    async fn min_and_max_pick_the_right_side() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 5;
        let t = 3;
        let width = 8;

        let parties = wire_clique(field, d);
        let a_shares = tallier_field::gen_shares(&field, 12, d, t);
        let b_shares = tallier_field::gen_shares(&field, 200, d, t);

        let min_futures = parties.iter().enumerate().map(|(i, mpc)| mpc.min(0, a_shares[i], b_shares[i], width));
        let min_results = futures::future::try_join_all(min_futures).await.unwrap();
        assert_eq!(open_all(&field, &parties, min_results).await, 12);

        let max_futures = parties
            .iter()
            .enumerate()
            .map(|(i, mpc)| mpc.max(1_000_000, a_shares[i], b_shares[i], width));
        let max_results = futures::future::try_join_all(max_futures).await.unwrap();
        assert_eq!(open_all(&field, &parties, max_results).await, 200);
    }
}
