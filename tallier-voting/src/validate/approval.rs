//! `approval`/`plurality`/`veto` validation (spec §4.F): every coordinate must be Boolean, and
//! for plurality/veto the coordinates must additionally sum to a fixed target.

use tallier_field::{Elem, Field};
use tallier_mpc::MpcVector;

use crate::error::VotingError;

fn complement(field: Field, votes: &[Elem]) -> Vec<Elem> {
    votes.iter().map(|&v| field.sub(field.one(), v)).collect()
}

/// Every coordinate of `votes` is in `{0, 1}`: `multiply(x, 1-x)` resolves to `0` everywhere.
pub async fn validate_approval(mpc: &MpcVector, msgid: u32, field: Field, votes: &[Elem]) -> Result<bool, VotingError> {
    let complement = complement(field, votes);
    let products = mpc.multiply(msgid, votes, &complement).await?;
    let opened = mpc.resolve(msgid + mpc.block_size(), &products).await?;
    Ok(opened.iter().all(|&a| a == 0))
}

/// `approval`'s per-coordinate Boolean check plus a batched check that the coordinates sum to
/// `target_sum` (spec §4.F): the sum and the `M` Boolean products resolve in the same round.
async fn validate_boolean_with_sum(
    mpc: &MpcVector,
    msgid: u32,
    field: Field,
    votes: &[Elem],
    target_sum: u32,
) -> Result<bool, VotingError> {
    let complement = complement(field, votes);
    let products = mpc.multiply(msgid, votes, &complement).await?;
    let sum = votes.iter().fold(field.zero(), |acc, &v| field.add(acc, v));

    let mut batch = Vec::with_capacity(products.len() + 1);
    batch.push(sum);
    batch.extend(products);

    let opened = mpc.resolve(msgid + mpc.block_size(), &batch).await?;
    Ok(opened[0] == field.reduce(target_sum as u64) && opened[1..].iter().all(|&a| a == 0))
}

/// Exactly one candidate approved (spec §4.F).
pub async fn validate_plurality(mpc: &MpcVector, msgid: u32, field: Field, votes: &[Elem]) -> Result<bool, VotingError> {
    validate_boolean_with_sum(mpc, msgid, field, votes, 1).await
}

/// Exactly one candidate vetoed, i.e. `M-1` approvals out of `M` (spec §4.F).
pub async fn validate_veto(mpc: &MpcVector, msgid: u32, field: Field, votes: &[Elem]) -> Result<bool, VotingError> {
    validate_boolean_with_sum(mpc, msgid, field, votes, (votes.len() as u32).saturating_sub(1)).await
}
