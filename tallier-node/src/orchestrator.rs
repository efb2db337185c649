//! The orchestrator (spec §4.G): the seam between the external front door/persistence layer and
//! the MPC core. It owns the long-lived [`CliqueManager`] and [`ElectionStore`] handle a tallier
//! process threads through its whole lifetime (SPEC_FULL.md §9 "global mutable state": the
//! original's module-level `computation_mpc`/`running_elections` become fields here instead).

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use tallier_clique::CliqueManager;
use tallier_field::{Elem, Field};
use tallier_mpc::{Mpc, MpcError, MpcVector, Parameters};
use tallier_transport::Framing;
use tallier_voting::{calc_winners, copeland_scores, maximin_scores, Election, ElectionRule};

use crate::error::OrchestratorError;
use crate::persistence::{ElectionStore, VoteState};

fn field_for(prime: u32) -> Result<Field, OrchestratorError> {
    Field::new(prime).map_err(MpcError::from).map_err(OrchestratorError::from)
}

/// A running validation round for one ballot (spec §6 front-door API `MpcValidation`): the
/// vector-framed mesh plus the election parameters `validate` needs to interpret it.
pub struct MpcValidation {
    mpc: MpcVector,
    field: Field,
    rule: ElectionRule,
    candidate_count: usize,
    range_bound: u32,
}

impl MpcValidation {
    pub async fn validate(&self, msgid: u32, shared_ballot: &[Elem]) -> Result<bool, OrchestratorError> {
        Ok(tallier_voting::validate(&self.mpc, msgid, self.field, self.rule, self.candidate_count, self.range_bound, shared_ballot).await?)
    }
}

/// A running winner-extraction round at election close (spec §6 front-door API `MpcWinner`):
/// the scalar-framed mesh plus enough of the election record to score and extract winners.
pub struct MpcWinner {
    mpc: Mpc,
    field: Field,
    rule: ElectionRule,
    candidates: Vec<String>,
    winner_count: usize,
}

impl MpcWinner {
    /// Per-rule score vector (spec §4.F): copeland/maximin derive theirs from the pairwise
    /// matrix; every other rule's running vote vector already *is* its score (the aggregate
    /// tally, one coordinate per candidate).
    pub async fn scores(&self, aggregated: &[Elem]) -> Result<Vec<Elem>, OrchestratorError> {
        let m = self.candidates.len();
        Ok(match self.rule {
            ElectionRule::Copeland => copeland_scores(&self.mpc, 0, self.field, m, aggregated).await?,
            ElectionRule::Maximin => maximin_scores(&self.mpc, 0, self.field, m, aggregated).await?,
            _ => aggregated.to_vec(),
        })
    }

    /// Top-K winner extraction (spec §4.F `calc_winners`) over an already-computed score
    /// vector. `score_msgid_span` generously separates this from whatever msgid range `scores`
    /// itself consumed, matching the rest of this corpus's "wider than strictly necessary"
    /// striding discipline (see `tallier-mpc`'s `tournament` module).
    pub async fn max(&self, scores: Vec<Elem>) -> Result<Vec<String>, OrchestratorError> {
        let msgbase = self.score_msgid_span();
        Ok(calc_winners(&self.mpc, msgbase, scores, self.candidates.clone(), self.winner_count).await?)
    }

    /// The plain (non-index-tracking) minimum of a shared vector, exposed directly for callers
    /// that want it without going through a whole rule's score function (spec §6 front-door API
    /// lists `min` alongside `max`/`scores`/`close`).
    pub async fn min(&self, values: &[Elem]) -> Result<Elem, OrchestratorError> {
        let bit_width = self.mpc.default_bit_width();
        Ok(self.mpc.min_reduce(0, values, bit_width).await?)
    }

    /// Tear down this instance's mesh (spec §5 "Cancellation": the enclosing `close` tears down
    /// the MPC instance and its channels). Dropping does the same; this just names the step the
    /// spec names.
    pub fn close(self) {
        drop(self);
    }

    fn score_msgid_span(&self) -> u32 {
        let bit_width = self.mpc.default_bit_width() as u32;
        let m = self.candidates.len().max(1) as u32;
        self.mpc.block_size() * (bit_width * 4 + 16) * 8 * m
    }
}

/// Ties the MPC core to one tallier process's [`CliqueManager`] and [`ElectionStore`] (spec
/// §4.G). This is the only type the front door (out of scope, spec §1) talks to.
pub struct Orchestrator {
    clique: Arc<CliqueManager>,
    self_id: u8,
    store: Arc<dyn ElectionStore>,
}

impl Orchestrator {
    pub fn new(clique: Arc<CliqueManager>, self_id: u8, store: Arc<dyn ElectionStore>) -> Orchestrator {
        Orchestrator { clique, self_id, store }
    }

    /// Start-of-epoch reset (spec §4.G "on tallier startup"): clear any residual running-election
    /// state left behind by a prior process lifetime.
    pub async fn on_startup(&self) -> Result<(), OrchestratorError> {
        info!("clearing residual running-election state");
        self.store.stop_all_elections().await
    }

    /// Open `election` for voting: initializes its running vote vector to zeros (spec §6
    /// `start_election`). Idempotent at the store layer is the store's business, not this
    /// method's; callers invoke it once, when the out-of-scope front door opens the election.
    pub async fn open_election(&self, election_id: Uuid) -> Result<(), OrchestratorError> {
        let election = self.store.get_election(election_id).await?;
        self.store.start_election(&election).await
    }

    /// `start_election_voting(election) -> MpcValidation` (spec §6): rendezvous the per-ballot
    /// mesh at the election's vector width and hand back a handle scoped to running `validate`.
    #[instrument(skip(self, peer_addresses), fields(election_id = %election.election_id))]
    pub async fn start_election_voting(&self, election: &Election, peer_addresses: &[SocketAddr]) -> Result<MpcValidation, OrchestratorError> {
        let field = field_for(election.prime)?;
        let width = election.message_size();
        let slots = self
            .clique
            .start_clique(election.election_id, peer_addresses, self.self_id, Framing::Vector(width))
            .await?;
        let params = Parameters::new(field, self.self_id, peer_addresses.len()).map_err(MpcError::from)?;
        Ok(MpcValidation {
            mpc: MpcVector::new(params, slots, width),
            field,
            rule: election.rule,
            candidate_count: election.candidate_count(),
            range_bound: election.range_bound,
        })
    }

    /// On ballot submit (spec §4.G): rendezvous the per-ballot mesh, run `validate`, and on
    /// success forward the (possibly zeroed-out) share tuple to the store for share-wise
    /// accumulation. `vote_state` carries the store-side booleans `votes_scale` multiplies in
    /// (SPEC_FULL.md §9): an invalid, replayed, or abstaining ballot is scaled to an all-zero
    /// share vector and still added, so the running vector's size never reveals which ballots
    /// were discarded.
    #[instrument(skip(self, peer_addresses, votes), fields(%election_id, %voter))]
    pub async fn submit_ballot(
        &self,
        election_id: Uuid,
        peer_addresses: &[SocketAddr],
        votes: Vec<Elem>,
        voter: Uuid,
        vote_state: VoteState,
    ) -> Result<bool, OrchestratorError> {
        let election = self.store.get_election(election_id).await?;
        let validation = self.start_election_voting(&election, peer_addresses).await?;
        let valid = validation.validate(0, &votes).await?;

        let scale = vote_state.scale(valid);
        let scaled: Vec<Elem> = votes.iter().map(|&v| validation.field.mul(v, scale)).collect();
        self.store.vote(&election, &scaled, voter, vote_state).await?;

        info!(valid, "ballot processed");
        Ok(valid)
    }

    /// On election stop (spec §4.G): fetch the aggregated share vector, rendezvous a
    /// scalar-framed mesh, score it (if the rule needs deriving a score from the raw vector),
    /// and extract the top-K winners.
    #[instrument(skip(self, peer_addresses), fields(%election_id))]
    pub async fn close_election(&self, election_id: Uuid, peer_addresses: &[SocketAddr]) -> Result<Vec<String>, OrchestratorError> {
        let election = self.store.get_election(election_id).await?;
        let aggregated = self
            .store
            .stop_election(election_id)
            .await?
            .ok_or(OrchestratorError::ElectionNotOpen { election_id })?;

        let field = field_for(election.prime)?;
        let slots = self
            .clique
            .start_clique(election_id, peer_addresses, self.self_id, Framing::Scalar)
            .await?;
        let params = Parameters::new(field, self.self_id, peer_addresses.len()).map_err(MpcError::from)?;
        let winner = MpcWinner {
            mpc: Mpc::new(params, slots),
            field,
            rule: election.rule,
            candidates: election.candidates.clone(),
            winner_count: election.winner_count,
        };

        let scores = winner.scores(&aggregated).await?;
        let winners = winner.max(scores).await?;
        winner.close();

        self.store.finish_election(election_id, &winners).await?;
        info!(?winners, "election closed");
        Ok(winners)
    }
}

#[cfg(test)]
mod tests {
    use tallier_field::gen_shares;

    use super::*;
    use crate::persistence::InMemoryStore;

    fn election(rule: ElectionRule, candidates: &[&str], winner_count: usize) -> Election {
        Election {
            election_id: Uuid::new_v4(),
            rule,
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            winner_count,
            prime: 2_147_483_647,
            range_bound: 5,
        }
    }

    /// An in-process stand-in for `Orchestrator::start_election_voting`/`close_election`'s mesh
    /// rendezvous, since these tests have no real TLS listener: each party gets a
    /// `tallier_transport` loopback grid directly rather than dialing through a `CliqueManager`.
    fn duplex_slots(d: usize, framing: Framing) -> Vec<Vec<Option<Arc<dyn tallier_transport::Channel>>>> {
        let mut grid: Vec<Vec<Option<Arc<dyn tallier_transport::Channel>>>> = (0..d).map(|_| (0..d).map(|_| None).collect()).collect();
        for i in 0..d {
            for j in 0..d {
                if i == j || grid[i][j].is_some() {
                    continue;
                }
                let (a, b) = tokio::io::duplex(1 << 20);
                let (ar, aw) = tokio::io::split(a);
                let (br, bw) = tokio::io::split(b);
                grid[i][j] = Some(tallier_transport::channel_from_halves(ar, aw, framing, j as u8));
                grid[j][i] = Some(tallier_transport::channel_from_halves(br, bw, framing, i as u8));
            }
        }
        grid
    }

    /// Each simulated tallier gets its own `InMemoryStore`, matching the real deployment (every
    /// tallier persists only *its own* share, never the others'). Spec §8 end-to-end scenario 1:
    /// three approval ballots, aggregate (2,2,2).
    #[tokio::test]
    async fn approval_ballots_validate_and_accumulate_to_the_expected_aggregate() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 3usize;
        let t = 2usize;
        let e = election(ElectionRule::Approval, &["alice", "bob", "charlie"], 1);
        let width = e.message_size();

        let stores: Vec<Arc<InMemoryStore>> = (0..d)
            .map(|_| {
                let store = Arc::new(InMemoryStore::new());
                store.seed(e.clone());
                store
            })
            .collect();
        for store in &stores {
            store.start_election(&e).await.unwrap();
        }

        let ballots = [[1u32, 0, 1], [0, 1, 1], [1, 1, 0]];
        for ballot in ballots {
            let shares: Vec<Vec<u32>> = ballot.iter().map(|&v| gen_shares(&field, v, d, t)).collect();
            let mut grids = duplex_slots(d, Framing::Vector(width));

            let futures = (0..d).map(|i| {
                let slots = std::mem::take(&mut grids[i]);
                let params = Parameters::new(field, i as u8, d).unwrap();
                let votes: Vec<u32> = shares.iter().map(|s| s[i]).collect();
                let validation = MpcValidation {
                    mpc: MpcVector::new(params, slots, width),
                    field,
                    rule: e.rule,
                    candidate_count: e.candidate_count(),
                    range_bound: e.range_bound,
                };
                async move { (validation.validate(0, &votes).await.unwrap(), votes) }
            });
            let results = futures::future::join_all(futures).await;
            assert!(results.iter().all(|(valid, _)| *valid), "every honest ballot must validate");

            for (i, (valid, votes)) in results.into_iter().enumerate() {
                let vote_state = VoteState { db_status: true, abstain: false };
                let scale = vote_state.scale(valid);
                let scaled: Vec<u32> = votes.iter().map(|&v| field.mul(v, scale)).collect();
                stores[i].vote(&e, &scaled, Uuid::new_v4(), vote_state).await.unwrap();
            }
        }

        let aggregates: Vec<Vec<u32>> = {
            let mut out = Vec::with_capacity(d);
            for store in &stores {
                out.push(store.stop_election(e.election_id).await.unwrap().unwrap());
            }
            out
        };
        let opened: Vec<u32> = (0..e.vote_vector_size())
            .map(|coord| {
                let points: Vec<(u32, u32)> = aggregates.iter().enumerate().map(|(i, v)| ((i + 1) as u32, v[coord])).collect();
                tallier_field::reconstruct(&field, &points, t).unwrap()
            })
            .collect();
        assert_eq!(opened, vec![2, 2, 2]);
    }

    /// A ballot scaled to zero by `VoteState` (an abstention, or a rejected `db_status`) is
    /// still added to the running vector — as an all-zero share — so the store never learns
    /// which submissions were discarded (SPEC_FULL.md §9).
    #[tokio::test]
    async fn an_abstaining_vote_contributes_nothing_but_is_still_recorded() {
        let field = Field::new(2_147_483_647).unwrap();
        let e = election(ElectionRule::Approval, &["alice", "bob"], 1);
        let store = InMemoryStore::new();
        store.seed(e.clone());
        store.start_election(&e).await.unwrap();

        let vote_state = VoteState { db_status: true, abstain: true };
        let scale = vote_state.scale(true);
        assert_eq!(scale, 0);
        let scaled = vec![field.mul(1, scale), field.mul(1, scale)];
        store.vote(&e, &scaled, Uuid::new_v4(), vote_state).await.unwrap();

        let aggregated = store.stop_election(e.election_id).await.unwrap().unwrap();
        assert_eq!(aggregated, vec![0, 0]);
    }

    /// `MpcWinner` ties `scores` and `max` together for a non-Condorcet rule, where the score
    /// vector is just the aggregate tally itself.
    #[tokio::test]
    async fn mpc_winner_extracts_top_candidate_from_raw_tallies() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 3usize;
        let t = 2usize;
        let candidates = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
        let tallies = [3u32, 9, 5];
        let shares: Vec<Vec<u32>> = tallies.iter().map(|&v| gen_shares(&field, v, d, t)).collect();
        let mut grids = duplex_slots(d, Framing::Scalar);

        let futures = (0..d).map(|i| {
            let slots = std::mem::take(&mut grids[i]);
            let params = Parameters::new(field, i as u8, d).unwrap();
            let aggregated: Vec<u32> = shares.iter().map(|s| s[i]).collect();
            let candidates = candidates.clone();
            async move {
                let winner = MpcWinner {
                    mpc: Mpc::new(params, slots),
                    field,
                    rule: ElectionRule::Plurality,
                    candidates,
                    winner_count: 1,
                };
                let scores = winner.scores(&aggregated).await.unwrap();
                winner.max(scores).await.unwrap()
            }
        });
        let results = futures::future::join_all(futures).await;
        for r in results {
            assert_eq!(r, vec!["bob".to_string()]);
        }
    }

    #[tokio::test]
    async fn unseeded_election_id_is_reported_as_unknown() {
        let store: Arc<dyn ElectionStore> = Arc::new(InMemoryStore::new());
        let e = election(ElectionRule::Approval, &["alice", "bob"], 1);
        let err = store.get_election(e.election_id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::UnknownElection { .. }));
    }

    #[tokio::test]
    async fn stopping_an_election_that_was_never_opened_returns_none() {
        let store = InMemoryStore::new();
        let e = election(ElectionRule::Approval, &["alice", "bob"], 1);
        store.seed(e.clone());
        assert!(store.stop_election(e.election_id).await.unwrap().is_none());
    }
}
