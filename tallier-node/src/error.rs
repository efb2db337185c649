use thiserror::Error;
use uuid::Uuid;

use tallier_clique::CliqueError;
use tallier_mpc::MpcError;
use tallier_voting::VotingError;

/// Errors the orchestrator surfaces to its caller (spec §4.G, §7). Unlike the lower layers,
/// this enum also carries the orchestrator's own bookkeeping failures (unknown election,
/// election not open) alongside everything it propagates from the core.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("no running election state for {election_id}")]
    ElectionNotOpen { election_id: Uuid },

    #[error("election {election_id} is not known to the persistence layer")]
    UnknownElection { election_id: Uuid },

    #[error(transparent)]
    Clique(#[from] CliqueError),

    #[error(transparent)]
    Mpc(#[from] MpcError),

    #[error(transparent)]
    Voting(#[from] VotingError),

    #[error("persistence layer failed: {0}")]
    Persistence(String),
}
