//! Top-`K` winner extraction (spec §4.F "winner extraction"): `K` rounds of arg-max over the
//! (scalar-engine) score vector, each round resolving one winning candidate and removing it from
//! the pool before the next round runs.

use tallier_field::Elem;
use tallier_mpc::Mpc;

use crate::error::VotingError;

pub async fn calc_winners(
    mpc: &Mpc,
    msgbase: u32,
    mut scores: Vec<Elem>,
    mut candidates: Vec<String>,
    winner_count: usize,
) -> Result<Vec<String>, VotingError> {
    let bit_width = mpc.default_bit_width();
    let mut winners = Vec::with_capacity(winner_count);
    let mut step = msgbase;

    while winners.len() < winner_count && !scores.is_empty() {
        let round_width = (scores.len() as u32).max(1);
        let round_stride = mpc.block_size() * (bit_width as u32 * 4 + 4) * 6 * round_width;

        let idx = mpc.max_indexed(step, &scores, bit_width).await? as usize;
        winners.push(candidates.remove(idx));
        scores.remove(idx);
        step += round_stride;
    }

    Ok(winners)
}
