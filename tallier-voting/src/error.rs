use thiserror::Error;

use tallier_mpc::MpcError;

/// Errors a voting-rule routine can surface (spec §4.F), all of which bottom out in the
/// underlying MPC engine failing.
#[derive(Debug, Error)]
pub enum VotingError {
    #[error(transparent)]
    Mpc(#[from] MpcError),
}
