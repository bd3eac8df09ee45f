//! # Matchings
//!
//! A matching is a bijection from row index to column index, stored as a
//! `Vec<usize>` of length `n` in which every value `0..n` appears exactly
//! once. It is both the hypothesis type the solver eliminates over and the
//! hidden pairing a judge holds.

use itertools::Itertools;
use rand::prelude::*;

/// One fully specified pairing hypothesis: `matching[row] == col`.
pub type Matching = Vec<usize>;

/// Largest matching size the full enumeration supports in practice.
///
/// `all_matchings` materializes all `n!` bijections, so memory and time grow
/// factorially; 10! is ~3.6M candidate vectors and is where the line is drawn.
pub const MAX_COUPLES: usize = 10;

/// Enumerates every bijection on `{0..num_couples}`, i.e. the full candidate
/// space of `num_couples!` matchings. Uniqueness holds by construction; the
/// order is unspecified. `num_couples = 0` yields the single empty matching.
pub fn all_matchings(num_couples: usize) -> Vec<Matching> {
    (0..num_couples).permutations(num_couples).collect_vec()
}

/// Draws a uniformly random matching, used by local judges to pick the hidden
/// pairing once per run.
pub fn random_matching(num_couples: usize, rng: &mut impl Rng) -> Matching {
    let mut matching = (0..num_couples).collect_vec();
    matching.shuffle(rng);
    matching
}

/// Counts slots on which two matchings agree. This is exactly the feedback a
/// guess night returns.
pub fn equal_slots(a: &Matching, b: &Matching) -> usize {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).filter(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha12Rng;
    use std::collections::HashSet;

    fn factorial(n: usize) -> usize {
        (1..=n).product()
    }

    #[test]
    fn test_all_matchings_counts() {
        for n in 0..=6 {
            let space = all_matchings(n);
            assert_eq!(space.len(), factorial(n), "n = {}", n);

            let distinct: HashSet<_> = space.iter().cloned().collect();
            assert_eq!(distinct.len(), space.len(), "n = {}", n);

            for matching in &space {
                let mut seen = vec![false; n];
                for &col in matching {
                    assert!(col < n);
                    assert!(!seen[col], "repeated column in {:?}", matching);
                    seen[col] = true;
                }
            }
        }
    }

    #[test]
    fn test_all_matchings_degenerate() {
        assert_eq!(all_matchings(0), vec![Matching::new()]);
        assert_eq!(all_matchings(1), vec![vec![0]]);
    }

    #[test]
    fn test_random_matching_is_bijection() {
        let mut rng = ChaCha12Rng::seed_from_u64(0xC0FF_EE42);
        for _ in 0..50 {
            let matching = random_matching(7, &mut rng);
            let mut sorted = matching.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..7).collect_vec());
        }
    }

    #[test]
    fn test_random_matching_seeded_reproducible() {
        let a = random_matching(8, &mut ChaCha12Rng::seed_from_u64(123));
        let b = random_matching(8, &mut ChaCha12Rng::seed_from_u64(123));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_slots() {
        assert_eq!(equal_slots(&vec![0, 1, 2], &vec![0, 1, 2]), 3);
        assert_eq!(equal_slots(&vec![0, 1, 2], &vec![0, 2, 1]), 1);
        assert_eq!(equal_slots(&vec![1, 2, 0], &vec![0, 1, 2]), 0);
        assert_eq!(equal_slots(&Matching::new(), &Matching::new()), 0);
    }
}
