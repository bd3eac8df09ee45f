use crate::matching::{Matching, equal_slots, random_matching};
use rand::prelude::*;

/// Answers the two query kinds against a hidden matching the caller never
/// sees. `truth_booth` and `guess_night` take `&mut self` because judges
/// account for the queries spent on them.
pub trait Judge {
    fn num_couples(&self) -> usize;
    /// Binary oracle: is `row` paired with `col` in the hidden matching?
    fn truth_booth(&mut self, row: usize, col: usize) -> bool;
    /// Full-matching feedback: how many slots of `guess` are correct.
    fn guess_night(&mut self, guess: &Matching) -> usize;
    /// Reveals the true column for `row`, if this judge is willing to.
    ///
    /// Only a self-play judge answers; against a real opponent there is no
    /// such reveal, which is why the forced-correct opening policy that
    /// relies on it inflates the estimate. Defaults to refusing.
    fn confirmed_pair(&self, _row: usize) -> Option<usize> {
        None
    }
    /// Total queries spent so far (booths plus nights).
    fn cost(&self) -> usize;
}

/// Self-play judge holding the hidden matching in memory.
pub struct LocalJudge {
    hidden: Matching,
    cost: usize,
}

impl Judge for LocalJudge {
    fn num_couples(&self) -> usize {
        self.hidden.len()
    }
    fn truth_booth(&mut self, row: usize, col: usize) -> bool {
        assert!(row < self.hidden.len() && col < self.hidden.len());
        self.cost += 1;
        self.hidden[row] == col
    }
    fn guess_night(&mut self, guess: &Matching) -> usize {
        self.cost += 1;
        equal_slots(&self.hidden, guess)
    }
    fn confirmed_pair(&self, row: usize) -> Option<usize> {
        Some(self.hidden[row])
    }
    fn cost(&self) -> usize {
        self.cost
    }
}

impl LocalJudge {
    pub fn new(num_couples: usize, seed: u64) -> Self {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
        Self {
            hidden: random_matching(num_couples, &mut rng),
            cost: 0,
        }
    }

    /// Builds a judge around a known hidden matching. Tests use this to keep
    /// the truth in hand while exercising the solver.
    pub fn from_matching(hidden: Matching) -> Self {
        Self { hidden, cost: 0 }
    }
}
