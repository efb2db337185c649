//! `borda` validation (spec §4.F): every coordinate is a rank in `[0, M-1]` (the same batched
//! range check as `range`), and the `M` ranks form a permutation. Permutation-hood is checked by
//! two independent randomized "every pair distinct" passes (accept if either passes), following
//! the original's masked-product trick: a jointly random scalar times a pairwise difference
//! resolves to `0` only if the difference itself was `0` (up to the usual `1/p` soundness error).

use tallier_field::{Elem, Field};
use tallier_mpc::MpcVector;

use crate::error::VotingError;
use crate::validate::range::validate_range;

async fn pair_distinct_pass(mpc: &MpcVector, msgid: u32, field: Field, votes: &[Elem]) -> Result<bool, VotingError> {
    let m = votes.len();
    let diffs: Vec<Elem> = (0..m)
        .flat_map(|i| ((i + 1)..m).map(move |j| (i, j)))
        .map(|(i, j)| field.sub(votes[i], votes[j]))
        .collect();

    let width = mpc.width().max(1);
    let mut step = msgid;
    for chunk in diffs.chunks(width) {
        let rnd = mpc.random_number(step, chunk.len()).await?;
        step += mpc.block_size();
        let masked = mpc.multiply(step, &rnd, chunk).await?;
        step += mpc.block_size();
        let opened = mpc.resolve(step, &masked).await?;
        step += mpc.block_size();
        if opened.iter().any(|&v| v == 0) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// `range(M-1)` plus two independent permutation passes (spec §4.F "borda").
pub async fn validate_borda(mpc: &MpcVector, msgid: u32, field: Field, votes: &[Elem]) -> Result<bool, VotingError> {
    let m = votes.len();
    let range_ok = validate_range(mpc, msgid, field, votes, (m as u32).saturating_sub(1)).await?;

    let pass_stride = mpc.block_size() * 3 * ((m * (m - 1) / 2).div_ceil(mpc.width().max(1)) as u32 + 1);
    let pass1_base = msgid + mpc.block_size() * (m as u32 + 2);
    let pass2_base = pass1_base + pass_stride;

    let (pass1, pass2) = tokio::try_join!(
        pair_distinct_pass(mpc, pass1_base, field, votes),
        pair_distinct_pass(mpc, pass2_base, field, votes),
    )?;

    Ok(range_ok && (pass1 || pass2))
}

#[cfg(test)]
mod tests {
    use tallier_field::gen_shares;

    use super::*;
    use crate::test_support::wire_vector as wire;

    #[tokio::test]
    async fn borda_accepts_a_permutation_and_rejects_a_repeat() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 3;
        let t = 2;
        let m = 4;

        for (ballot, expected) in [([0u32, 1, 2, 3], true), ([0u32, 1, 1, 3], false)] {
            let parties = wire(field, d, m);
            let shares: Vec<Vec<Elem>> = ballot.iter().map(|&b| gen_shares(&field, b, d, t)).collect();
            let futures = parties.iter().enumerate().map(|(i, mpc)| {
                let votes: Vec<Elem> = shares.iter().map(|s| s[i]).collect();
                async move { validate_borda(mpc, 0, field, &votes).await }
            });
            let results = futures::future::try_join_all(futures).await.unwrap();
            assert!(results.iter().all(|&r| r == expected));
        }
    }

    #[tokio::test]
    async fn borda_rejects_an_out_of_range_rank() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 3;
        let t = 2;
        let m = 3;
        let parties = wire(field, d, m);

        let ballot = [0u32, 1, 5];
        let shares: Vec<Vec<Elem>> = ballot.iter().map(|&b| gen_shares(&field, b, d, t)).collect();
        let futures = parties.iter().enumerate().map(|(i, mpc)| {
            let votes: Vec<Elem> = shares.iter().map(|s| s[i]).collect();
            async move { validate_borda(mpc, 0, field, &votes).await }
        });
        let results = futures::future::try_join_all(futures).await.unwrap();
        assert!(results.iter().all(|&r| !r));
    }
}
