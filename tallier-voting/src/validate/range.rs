//! `range` validation (spec §4.F): every coordinate lies in `[0, L]`, checked via the batched
//! product `prod(x_m - k for k in 0..=L)` resolving to `0` for every candidate `m`.

use tallier_field::{Elem, Field};
use tallier_mpc::MpcVector;

use crate::error::VotingError;

pub async fn validate_range(mpc: &MpcVector, msgid: u32, field: Field, votes: &[Elem], max_value: u32) -> Result<bool, VotingError> {
    let mut product = votes.to_vec();
    let mut step = msgid;

    for k in 0..=max_value {
        let subtrahend: Vec<Elem> = votes.iter().map(|&v| field.sub(v, field.reduce(k as u64))).collect();
        product = mpc.multiply(step, &product, &subtrahend).await?;
        step += mpc.block_size();
    }

    let opened = mpc.resolve(step, &product).await?;
    Ok(opened.iter().all(|&a| a == 0))
}

#[cfg(test)]
mod tests {
    use tallier_field::gen_shares;

    use super::*;
    use crate::test_support::wire_vector as wire;

    #[tokio::test]
    async fn range_accepts_in_bound_scores_and_rejects_out_of_bound() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 3;
        let t = 2;
        let m = 3;
        let max_value = 5;

        for (ballot, expected) in [([0u32, 3, 5], true), ([0u32, 6, 5], false)] {
            let parties = wire(field, d, m);
            let shares: Vec<Vec<Elem>> = ballot.iter().map(|&b| gen_shares(&field, b, d, t)).collect();
            let futures = parties.iter().enumerate().map(|(i, mpc)| {
                let votes: Vec<Elem> = shares.iter().map(|s| s[i]).collect();
                async move { validate_range(mpc, 0, field, &votes, max_value).await }
            });
            let results = futures::future::try_join_all(futures).await.unwrap();
            assert!(results.iter().all(|&r| r == expected));
        }
    }
}
