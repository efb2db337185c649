//! The persistence interface consumed by the orchestrator (spec §6): store-agnostic, so the
//! relational store that owns ballot ingestion and vote-vector storage (explicitly out of
//! scope, spec §1) can be swapped in without the core knowing its shape. [`InMemoryStore`] is
//! the reference implementation this crate tests itself against.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use tallier_field::Elem;
use tallier_voting::Election;

use crate::error::OrchestratorError;

/// Whether a voter's row in the store currently permits the requested state transition
/// ("db_status" in the original, SPEC_FULL.md §9 "resolutions adopted"), and whether this
/// submission is an abstention. Both are plain booleans the front door already knows; neither
/// passes through the MPC engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteState {
    pub db_status: bool,
    pub abstain: bool,
}

impl VoteState {
    /// `votes_scale` (SPEC_FULL.md §9): the product of `validate`, `db_status`, and
    /// `not_abstain`, each lifted to `{0,1}` before multiplying. `db_status` is typed as `bool`
    /// rather than an untyped integer, which is exactly the port's resolution of the original's
    /// "treat `db_status` in {0,1} strictly" note: there is no other value it could hold.
    pub fn scale(self, validate: bool) -> Elem {
        (validate && self.db_status && !self.abstain) as Elem
    }
}

/// Store-agnostic persistence, consumed by [`crate::Orchestrator`] (spec §6).
#[async_trait]
pub trait ElectionStore: Send + Sync {
    async fn get_election(&self, id: Uuid) -> Result<Election, OrchestratorError>;

    /// Initialize the running vote vector to `N(election)` zero shares.
    async fn start_election(&self, election: &Election) -> Result<(), OrchestratorError>;

    /// The aggregated share vector, or `None` if the election was never opened (or was already
    /// stopped).
    async fn stop_election(&self, id: Uuid) -> Result<Option<Vec<Elem>>, OrchestratorError>;

    /// Start-of-epoch reset (spec §4.G "on tallier startup"): clears every running election's
    /// in-memory state, as if every open election had just been stopped without a result.
    async fn stop_all_elections(&self) -> Result<(), OrchestratorError>;

    /// Share-wise add `share_vector` (already scaled by [`VoteState::scale`]) into the running
    /// vector for `election`, and record `voter`'s new state.
    async fn vote(&self, election: &Election, share_vector: &[Elem], voter: Uuid, new_state: VoteState) -> Result<(), OrchestratorError>;

    async fn finish_election(&self, id: Uuid, winners: &[String]) -> Result<(), OrchestratorError>;
}

struct RunningElection {
    election: Election,
    vector: Vec<Elem>,
}

/// An in-process store used by this crate's own tests and suitable as a development stand-in;
/// the real deployment talks to the relational store the spec places out of scope.
#[derive(Default)]
pub struct InMemoryStore {
    elections: Mutex<HashMap<Uuid, Election>>,
    running: Mutex<HashMap<Uuid, RunningElection>>,
    voters: Mutex<HashMap<(Uuid, Uuid), VoteState>>,
    winners: Mutex<HashMap<Uuid, Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore::default()
    }

    /// Test/deployment seam: register an election record so `get_election`/`start_election`
    /// have something to find. Not part of the spec's persistence interface itself, which takes
    /// election creation as already having happened in the out-of-scope store.
    pub fn seed(&self, election: Election) {
        self.elections.lock().unwrap().insert(election.election_id, election);
    }
}

#[async_trait]
impl ElectionStore for InMemoryStore {
    async fn get_election(&self, id: Uuid) -> Result<Election, OrchestratorError> {
        self.elections
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(OrchestratorError::UnknownElection { election_id: id })
    }

    async fn start_election(&self, election: &Election) -> Result<(), OrchestratorError> {
        let n = election.vote_vector_size();
        self.running.lock().unwrap().insert(
            election.election_id,
            RunningElection {
                election: election.clone(),
                vector: vec![0; n],
            },
        );
        Ok(())
    }

    async fn stop_election(&self, id: Uuid) -> Result<Option<Vec<Elem>>, OrchestratorError> {
        Ok(self.running.lock().unwrap().remove(&id).map(|r| r.vector))
    }

    async fn stop_all_elections(&self) -> Result<(), OrchestratorError> {
        self.running.lock().unwrap().clear();
        Ok(())
    }

    async fn vote(&self, election: &Election, share_vector: &[Elem], voter: Uuid, new_state: VoteState) -> Result<(), OrchestratorError> {
        let field = tallier_field::Field::new(election.prime).map_err(|e| OrchestratorError::Persistence(e.to_string()))?;
        let mut running = self.running.lock().unwrap();
        let entry = running
            .get_mut(&election.election_id)
            .ok_or(OrchestratorError::ElectionNotOpen { election_id: election.election_id })?;
        for (slot, delta) in entry.vector.iter_mut().zip(share_vector.iter()) {
            *slot = field.add(*slot, *delta);
        }
        drop(running);
        self.voters.lock().unwrap().insert((election.election_id, voter), new_state);
        Ok(())
    }

    async fn finish_election(&self, id: Uuid, winners: &[String]) -> Result<(), OrchestratorError> {
        self.winners.lock().unwrap().insert(id, winners.to_vec());
        Ok(())
    }
}
