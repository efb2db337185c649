//! Index-tracking maximum and plain-value minimum reductions over a vector of shares (spec
//! §4.D `max`/`min`, as used by `calc_winners` and the maximin score), both a pairwise
//! tournament built on `less`.

use tallier_field::Elem;

use super::Mpc;
use crate::error::MpcError;

/// The msgid footprint of one tournament round: each pairing runs one `less` (three
/// `less_middle` calls under the hood, plus a combining multiply) and, for the indexed variant,
/// four more multiplies to mask out the losing index/value. Generously separated, matching the
/// rest of this crate's "stride wider than strictly necessary" discipline.
fn round_stride(block_size: u32, bit_width: usize) -> u32 {
    block_size * (bit_width as u32 * 4 + 4) * 6
}

impl Mpc {
    /// One pairing of the indexed tournament: `less(a.1, b.1)` picks a side, then each of
    /// index/value is masked independently so the loser's contribution is zero.
    async fn max_index_step(&self, msgid: u32, bit_width: usize, a: (Elem, Elem), b: (Elem, Elem)) -> Result<(Elem, Elem), MpcError> {
        let field = self.params.field;
        let gap = self.params.block_size * (bit_width as u32 * 4 + 4);
        let c = self.less(msgid, a.1, b.1, bit_width).await?;
        let not_c = field.sub(field.one(), c);

        let (v1, i1, v2, i2) = tokio::try_join!(
            self.multiply(msgid + gap, c, b.1),
            self.multiply(msgid + 2 * gap, c, b.0),
            self.multiply(msgid + 3 * gap, not_c, a.1),
            self.multiply(msgid + 4 * gap, not_c, a.0),
        )?;
        Ok((field.add(i1, i2), field.add(v1, v2)))
    }

    /// The arg-max of `values` (spec §4.D `max`): a tournament of `(index, value)` pairs,
    /// combined pairwise via `less`, with the winning index resolved in the clear at the end.
    /// `calc_winners` (tallier-voting) calls this once per round of top-K extraction.
    pub async fn max_indexed(&self, msgid: u32, values: &[Elem], bit_width: usize) -> Result<u32, MpcError> {
        let field = self.params.field;
        if values.len() == 1 {
            return Ok(0);
        }

        let mut round: Vec<(Elem, Elem)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (field.reduce(i as u64), *v))
            .collect();
        let stride = round_stride(self.params.block_size, bit_width);
        let mut step = msgid;

        while round.len() > 1 {
            let pair_count = round.len() / 2;
            let futures = (0..pair_count).map(|i| {
                let base = step + (i as u32) * stride;
                self.max_index_step(base, bit_width, round[2 * i], round[2 * i + 1])
            });
            let mut next = futures::future::try_join_all(futures).await?;
            if round.len() % 2 == 1 {
                next.push(round[round.len() - 1]);
            }
            step += stride * (pair_count.max(1) as u32);
            round = next;
        }

        self.resolve(step, round[0].0).await
    }

    /// The minimum of `values` as a share, not resolved (spec §4.D `min`; used by the maximin
    /// score, which needs the minimum margin as a further shared value, not a cleartext result).
    pub async fn min_reduce(&self, msgid: u32, values: &[Elem], bit_width: usize) -> Result<Elem, MpcError> {
        assert!(!values.is_empty(), "min_reduce requires at least one value");
        let mut round = values.to_vec();
        let stride = round_stride(self.params.block_size, bit_width);
        let mut step = msgid;

        while round.len() > 1 {
            let pair_count = round.len() / 2;
            let futures = (0..pair_count).map(|i| {
                let base = step + (i as u32) * stride;
                self.min(base, round[2 * i], round[2 * i + 1], bit_width)
            });
            let mut next = futures::future::try_join_all(futures).await?;
            if round.len() % 2 == 1 {
                next.push(round[round.len() - 1]);
            }
            step += stride * (pair_count.max(1) as u32);
            round = next;
        }

        Ok(round[0])
    }
}

#[cfg(test)]
mod tests {
    use tallier_field::Field;

    use super::*;
    use crate::test_support::{open_all, wire_clique};

    #[tokio::test]
    async fn max_indexed_finds_the_unique_maximum() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 5;
        let t = 3;
        let parties = wire_clique(field, d);
        let width = 8;

        let secrets = [3u32, 7, 5, 9, 2];
        let shares: Vec<Vec<Elem>> = secrets.iter().map(|s| tallier_field::gen_shares(&field, *s, d, t)).collect();

        let futures = parties.iter().enumerate().map(|(i, mpc)| {
            let values: Vec<Elem> = shares.iter().map(|s| s[i]).collect();
            async move { mpc.max_indexed(0, &values, width).await }
        });
        let results = futures::future::try_join_all(futures).await.unwrap();
        for r in results {
            assert_eq!(r, 3);
        }
    }

    #[tokio::test]
    async fn min_reduce_finds_the_minimum() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 5;
        let t = 3;
        let parties = wire_clique(field, d);
        let width = 8;

        let secrets = [12u32, 4, 9, 200];
        let shares: Vec<Vec<Elem>> = secrets.iter().map(|s| tallier_field::gen_shares(&field, *s, d, t)).collect();

        let futures = parties.iter().enumerate().map(|(i, mpc)| {
            let values: Vec<Elem> = shares.iter().map(|s| s[i]).collect();
            async move { mpc.min_reduce(0, &values, width).await }
        });
        let results = futures::future::try_join_all(futures).await.unwrap();
        assert_eq!(open_all(&field, &parties, results).await, 4);
    }
}
