//! Per-rule ballot validation (spec §4.F): `validate(rule, x_i)` resolves a boolean decision on
//! every tallier simultaneously. Dispatched by `ElectionRule` as a tagged enum match (spec
//! "REDESIGN FLAGS": dynamic rule dispatch needs no virtual tables here).

mod approval;
mod borda;
mod condorcet;
mod range;

use tallier_field::{Elem, Field};
use tallier_mpc::MpcVector;

use crate::election::ElectionRule;
use crate::error::VotingError;

/// Validate one ballot's coordinates `votes` (length `election.vote_vector_size()`) under
/// `rule`. `range_bound` is only consulted for [`ElectionRule::Range`].
pub async fn validate(
    mpc: &MpcVector,
    msgid: u32,
    field: Field,
    rule: ElectionRule,
    candidate_count: usize,
    range_bound: u32,
    votes: &[Elem],
) -> Result<bool, VotingError> {
    match rule {
        ElectionRule::Approval => approval::validate_approval(mpc, msgid, field, votes).await,
        ElectionRule::Plurality => approval::validate_plurality(mpc, msgid, field, votes).await,
        ElectionRule::Veto => approval::validate_veto(mpc, msgid, field, votes).await,
        ElectionRule::Range => range::validate_range(mpc, msgid, field, votes, range_bound).await,
        ElectionRule::Borda => borda::validate_borda(mpc, msgid, field, votes).await,
        ElectionRule::Copeland | ElectionRule::Maximin => condorcet::validate_condorcet(mpc, msgid, field, votes, candidate_count).await,
    }
}
