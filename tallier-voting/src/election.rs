//! The election record (spec §3): immutable once created, consumed by both the validation and
//! scoring sides of every voting rule.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which voting rule an election was created under (spec §3, §4.F).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionRule {
    Approval,
    Plurality,
    Veto,
    Range,
    Borda,
    Copeland,
    Maximin,
}

impl ElectionRule {
    /// Whether this rule's ballots encode the upper-triangle pairwise-comparison matrix
    /// (`N = M(M-1)/2`) rather than one coordinate per candidate (`N = M`).
    pub fn is_condorcet(self) -> bool {
        matches!(self, ElectionRule::Copeland | ElectionRule::Maximin)
    }
}

/// Immutable per-election parameters (spec §3 "Election record"). `candidates`, `p`, and `range`
/// are consumed directly by the voting-rule and orchestrator layers; `election_id` and
/// `winner_count` round-trip through the persistence interface opaquely as far as this crate is
/// concerned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Election {
    pub election_id: Uuid,
    pub rule: ElectionRule,
    pub candidates: Vec<String>,
    pub winner_count: usize,
    pub prime: u32,
    /// The range-rule upper bound `L`; unused (but present) for every other rule.
    pub range_bound: u32,
}

impl Election {
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// `N(election)` (spec §3): the running vote vector's width. `M` for every rule except the
    /// two Condorcet rules, which instead hold one shared entry per unordered candidate pair.
    pub fn vote_vector_size(&self) -> usize {
        let m = self.candidate_count();
        if self.rule.is_condorcet() {
            m * (m.saturating_sub(1)) / 2
        } else {
            m
        }
    }

    /// The vector-channel width `S` a mesh must be dialed with to run `validate` for this
    /// election (spec §4.B, §4.E).
    ///
    /// `plurality`/`veto` need one slot more than `M` because their validator resolves the
    /// per-candidate Boolean check and the ballot's overall sum in the same batched round
    /// (spec §4.F). `range` and `borda` resolve this port's own two `NotImplementedError` arms
    /// in the original (SPEC_FULL.md §9): both batch one slot per candidate per round. Copeland
    /// and maximin share the same Condorcet validator (§4.F), which needs the full pairwise-entry
    /// width in a single round regardless of which of the two rules is asking — the original's
    /// narrower `M - 1` for maximin looks like a bug against its own shared validator, and this
    /// port does not reproduce it (see DESIGN.md).
    pub fn message_size(&self) -> usize {
        let m = self.candidate_count();
        match self.rule {
            ElectionRule::Approval => m,
            ElectionRule::Plurality | ElectionRule::Veto => m + 1,
            ElectionRule::Range | ElectionRule::Borda => m,
            ElectionRule::Copeland | ElectionRule::Maximin => m * (m.saturating_sub(1)) / 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election(rule: ElectionRule, m: usize) -> Election {
        Election {
            election_id: Uuid::nil(),
            rule,
            candidates: (0..m).map(|i| format!("candidate-{i}")).collect(),
            winner_count: 1,
            prime: 2_147_483_647,
            range_bound: 5,
        }
    }

    #[test]
    fn vote_vector_size_is_m_for_non_condorcet_rules() {
        assert_eq!(election(ElectionRule::Approval, 4).vote_vector_size(), 4);
        assert_eq!(election(ElectionRule::Borda, 4).vote_vector_size(), 4);
    }

    #[test]
    fn vote_vector_size_is_upper_triangle_for_condorcet_rules() {
        assert_eq!(election(ElectionRule::Copeland, 4).vote_vector_size(), 6);
        assert_eq!(election(ElectionRule::Maximin, 4).vote_vector_size(), 6);
    }

    #[test]
    fn message_size_matches_per_rule_table() {
        assert_eq!(election(ElectionRule::Approval, 3).message_size(), 3);
        assert_eq!(election(ElectionRule::Plurality, 3).message_size(), 4);
        assert_eq!(election(ElectionRule::Veto, 3).message_size(), 4);
        assert_eq!(election(ElectionRule::Range, 3).message_size(), 3);
        assert_eq!(election(ElectionRule::Borda, 3).message_size(), 3);
        assert_eq!(election(ElectionRule::Copeland, 3).message_size(), 3);
        assert_eq!(election(ElectionRule::Maximin, 3).message_size(), 3);
    }
}
