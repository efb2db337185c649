//! Copeland and maximin score computation (spec §4.F "scoring"): runs over the scalar engine
//! against the election's already-aggregated (summed across every ballot, still secret-shared)
//! pairwise-entry vector, not the per-ballot vector engine `validate` uses.

use tallier_field::{Elem, Field};
use tallier_mpc::Mpc;

use crate::error::VotingError;
use crate::pairwise::build_q;

/// Weight given to an indifference (`q == 0`) in the Copeland score, matching the original's
/// `alpha_s` test constant. Not election-configurable: every tallier must agree on it to compute
/// the same score.
pub const COPELAND_TIE_WEIGHT: Elem = 1;
/// Weight given to a strict win (`q > 0`) in the Copeland score (the original's `alpha_t`).
pub const COPELAND_WIN_WEIGHT: Elem = 2;

/// For each candidate, `alpha_t * (strict wins) + alpha_s * (indifferences)` against every other
/// candidate (spec §4.F "Copeland score").
pub async fn copeland_scores(mpc: &Mpc, msgbase: u32, field: Field, m: usize, votes: &[Elem]) -> Result<Vec<Elem>, VotingError> {
    let q = build_q(field, votes, m);
    let bit_width = mpc.default_bit_width();
    let block = mpc.block_size();
    let zero_stride = block * 3;
    let positive_stride = block * (bit_width as u32 * 2 + 8);

    let pairs: Vec<(usize, usize)> = (0..m).flat_map(|cand| (0..m).filter(move |&m2| m2 != cand).map(move |m2| (cand, m2))).collect();

    let zero_futures = pairs.iter().enumerate().map(|(idx, &(cand, m2))| {
        let msgid = msgbase + (idx as u32) * zero_stride;
        mpc.is_zero(msgid, q[cand][m2])
    });
    let positive_base = msgbase + (pairs.len() as u32) * zero_stride;
    let positive_futures = pairs.iter().enumerate().map(|(idx, &(cand, m2))| {
        let msgid = positive_base + (idx as u32) * positive_stride;
        mpc.is_positive(msgid, q[cand][m2], bit_width)
    });

    let (zeros, positives) = tokio::try_join!(futures::future::try_join_all(zero_futures), futures::future::try_join_all(positive_futures))?;

    let mut scores = vec![field.zero(); m];
    for (idx, &(cand, _)) in pairs.iter().enumerate() {
        let tie_term = field.mul(COPELAND_TIE_WEIGHT, zeros[idx]);
        let win_term = field.mul(COPELAND_WIN_WEIGHT, positives[idx]);
        scores[cand] = field.add(scores[cand], field.add(tie_term, win_term));
    }
    Ok(scores)
}

/// For each candidate, the minimum of its `M-1` signed pairwise margins against every other
/// candidate (spec §4.F "maximin score"); a share, not resolved, since the winner extraction
/// that follows needs it as a further shared value.
pub async fn maximin_scores(mpc: &Mpc, msgbase: u32, field: Field, m: usize, votes: &[Elem]) -> Result<Vec<Elem>, VotingError> {
    let q = build_q(field, votes, m);
    let bit_width = mpc.default_bit_width();
    let stride = mpc.block_size() * (bit_width as u32 * 4 + 4) * 6 * (m as u32).max(1);

    let futures = (0..m).map(|cand| {
        let values: Vec<Elem> = (0..m).filter(|&m2| m2 != cand).map(|m2| q[cand][m2]).collect();
        let msgid = msgbase + (cand as u32) * stride;
        async move { mpc.min_reduce(msgid, &values, bit_width).await }
    });
    let scores = futures::future::try_join_all(futures).await?;
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use tallier_field::gen_shares;

    use super::*;
    use crate::test_support::wire_scalar as wire;

    #[tokio::test]
    async fn copeland_scores_rewards_strict_wins_over_ties() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 3;
        let t = 2;
        let m = 3;
        let parties = wire(field, d);

        // A beats B, A beats C, B ties C: A should score strictly higher than B and C.
        let votes = [1u32, 1, 0];
        let shares: Vec<Vec<Elem>> = votes.iter().map(|&v| gen_shares(&field, v, d, t)).collect();

        let futures = parties.iter().enumerate().map(|(i, mpc)| {
            let votes: Vec<Elem> = shares.iter().map(|s| s[i]).collect();
            async move { copeland_scores(mpc, 0, field, m, &votes).await }
        });
        let results = futures::future::try_join_all(futures).await.unwrap();

        let n = results[0].len();
        let opened: Vec<Elem> = (0..n)
            .map(|coord| {
                let points: Vec<(u32, Elem)> = results.iter().enumerate().map(|(i, r)| ((i + 1) as u32, r[coord])).collect();
                tallier_field::reconstruct(&field, &points, t).unwrap()
            })
            .collect();

        assert_eq!(opened[0], field.mul(2, COPELAND_WIN_WEIGHT));
        assert_eq!(opened[1], COPELAND_TIE_WEIGHT);
        assert_eq!(opened[2], COPELAND_TIE_WEIGHT);
    }

    #[tokio::test]
    async fn maximin_scores_picks_the_worst_margin() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 3;
        let t = 2;
        let m = 3;
        let parties = wire(field, d);

        // A beats B by 1, A beats C by 1, B beats C by 3 (margins encoded directly as entries,
        // not bounded to {-1,0,1} here since maximin scores raw margins, unlike the Condorcet
        // validator which only ever sees {-1,0,1}).
        let votes = [1u32, 1, 3];
        let shares: Vec<Vec<Elem>> = votes.iter().map(|&v| gen_shares(&field, v, d, t)).collect();

        let futures = parties.iter().enumerate().map(|(i, mpc)| {
            let votes: Vec<Elem> = shares.iter().map(|s| s[i]).collect();
            async move { maximin_scores(mpc, 0, field, m, &votes).await }
        });
        let results = futures::future::try_join_all(futures).await.unwrap();

        let n = results[0].len();
        let opened: Vec<Elem> = (0..n)
            .map(|coord| {
                let points: Vec<(u32, Elem)> = results.iter().enumerate().map(|(i, r)| ((i + 1) as u32, r[coord])).collect();
                tallier_field::reconstruct(&field, &points, t).unwrap()
            })
            .collect();

        // A: min(1, 1) = 1. B: min(-1, 3) = -1. C: min(-1, -3) = -3.
        assert_eq!(opened[0], 1);
        assert_eq!(opened[1], field.neg(1));
        assert_eq!(opened[2], field.neg(3));
    }
}
