//! Voting-rule primitives built on the MPC engine (spec §4.F): the election record, per-rule
//! ballot validation, per-rule score computation, and top-`K` winner extraction.

mod election;
mod error;
mod pairwise;
mod score;
mod test_support;
mod validate;
mod winners;

pub use election::{Election, ElectionRule};
pub use error::VotingError;
pub use score::{copeland_scores, maximin_scores, COPELAND_TIE_WEIGHT, COPELAND_WIN_WEIGHT};
pub use validate::validate;
pub use winners::calc_winners;
