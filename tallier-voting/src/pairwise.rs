//! Shared upper-triangle pairwise-entry indexing for the Condorcet rules (copeland, maximin):
//! a ballot for these rules carries one shared entry per unordered candidate pair, ordered
//! `(0,1), (0,2), ..., (0,M-1), (1,2), ...` (spec §3 "Vote-vector size").

use tallier_field::{Elem, Field};

/// The linear index of `(m1, m2)` (`m1 < m2`) in the upper-triangle vote vector.
pub fn pair_index(m1: usize, m2: usize, m: usize) -> usize {
    debug_assert!(m1 < m2 && m2 < m);
    m2 - m1 - 1 + m1 * m - m1 * (m1 + 1) / 2
}

/// Every `(m1, m2)` with `m1 < m2 < m`, in vote-vector order.
pub fn upper_pairs(m: usize) -> Vec<(usize, usize)> {
    (0..m).flat_map(|m1| ((m1 + 1)..m).map(move |m2| (m1, m2))).collect()
}

/// The antisymmetric lookup `gamma(m1, m2) = -gamma(m2, m1)`, `gamma(m, m) = 0` (spec §4.F).
pub fn gamma(field: Field, votes: &[Elem], m1: usize, m2: usize, m: usize) -> Elem {
    if m1 == m2 {
        field.zero()
    } else if m2 < m1 {
        field.neg(gamma(field, votes, m2, m1, m))
    } else {
        votes[pair_index(m1, m2, m)]
    }
}

/// The full `M x M` antisymmetric tournament matrix built from the ballot's shared
/// upper-triangle entries (spec §4.F, used by both `validate_condorcet` and the score functions).
pub fn build_q(field: Field, votes: &[Elem], m: usize) -> Vec<Vec<Elem>> {
    (0..m).map(|m1| (0..m).map(|m2| gamma(field, votes, m1, m2, m)).collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_index_matches_combinations_enumeration_order() {
        let m = 4;
        let pairs = upper_pairs(m);
        for (idx, &(a, b)) in pairs.iter().enumerate() {
            assert_eq!(pair_index(a, b, m), idx);
        }
    }

    #[test]
    fn gamma_is_antisymmetric() {
        let field = Field::new(101).unwrap();
        let votes = [5u32, 7, 3];
        let m = 3;
        assert_eq!(gamma(field, &votes, 0, 1, m), 5);
        assert_eq!(gamma(field, &votes, 1, 0, m), field.neg(5));
        assert_eq!(gamma(field, &votes, 2, 2, m), 0);
    }
}
