//! # Candidate Elimination Engine
//!
//! Starting from all `n!` matchings, each round spends one truth booth and
//! one guess night, pruning the candidate set with both answers. After `n`
//! rounds the run has converged iff exactly one candidate survives.
//!
//! Soundness invariant: a truthful judge can never eliminate the hidden
//! matching, so an empty candidate set is an internal defect and surfaces as
//! an [`EngineError`], never as a legitimate outcome.

use crate::judge::Judge;
use crate::mat;
use crate::matching::{Matching, all_matchings, equal_slots};
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use thiserror::Error;

/// Pairs already sent to the truth booth this run; never re-queried.
pub type Checked = FxHashSet<(usize, usize)>;

// ------------------------------ Configuration ----------------------------

/// What the strategy does with its very first truth booth, before any
/// evidence exists to rank pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirstQueryPolicy {
    /// Spend the opening booth on a pair the judge confirms in advance via
    /// [`Judge::confirmed_pair`]. Only a self-play judge cooperates; this
    /// inflates the estimate relative to a blind opening. Falls back to the
    /// ordinary max-count rule when the judge refuses.
    ForcedCorrect,
    /// Open with a uniformly random pair.
    Random,
}

#[derive(Clone, Copy, Debug)]
pub struct StrategyConfig {
    pub first_query: FirstQueryPolicy,
    /// Upper bound of the uniform jitter added to each pair score in
    /// [`pick_guess`]. Randomizes exact ties; zero disables it and ties fall
    /// to row-major order.
    pub jitter: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            first_query: FirstQueryPolicy::ForcedCorrect,
            jitter: 0.1,
        }
    }
}

// ------------------------------ Engine errors ----------------------------

/// Internal-consistency defects. None of these can occur against a truthful
/// judge; they indicate a bug, and callers must fail the whole run on them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("candidate set emptied in round {round}; the hidden matching was lost")]
    EmptyCandidates { round: usize },
    #[error("greedy assignment left {unassigned} rows without a column")]
    IncompleteGuess { unassigned: usize },
    #[error("no untested pair left for the truth booth")]
    NoUntestedPair,
}

// --------------------------- Frequency estimation ------------------------

/// Counts, for every (row, col), how many candidates map row to col.
/// Row sums and column sums both equal the candidate count.
pub fn pair_counts(num_couples: usize, candidates: &[Matching]) -> Vec<Vec<usize>> {
    let mut counts = mat![0usize; num_couples; num_couples];
    for matching in candidates {
        for (row, &col) in matching.iter().enumerate() {
            counts[row][col] += 1;
        }
    }
    counts
}

// ----------------------------- Booth selection ---------------------------

/// The unchecked pair the current evidence believes in most strongly:
/// maximum count, ties to the earliest pair in row-major order.
fn select_booth(counts: &[Vec<usize>], checked: &Checked) -> Option<(usize, usize)> {
    let n = counts.len();
    let mut best = None;
    for row in 0..n {
        for col in 0..n {
            if checked.contains(&(row, col)) {
                continue;
            }
            best = best.max(Some((counts[row][col], Reverse((row, col)))));
        }
    }
    best.map(|(_, Reverse(pair))| pair)
}

// -------------------------------- Pruning --------------------------------

/// Keeps the candidates consistent with a booth answer: `row` maps to `col`
/// iff `paired`.
pub fn prune_booth(
    candidates: Vec<Matching>,
    row: usize,
    col: usize,
    paired: bool,
) -> Vec<Matching> {
    candidates
        .into_iter()
        .filter(|matching| (matching[row] == col) == paired)
        .collect()
}

/// Keeps the candidates that would have produced the same guess-night
/// feedback as the hidden matching did.
pub fn prune_guess(candidates: Vec<Matching>, guess: &Matching, hits: usize) -> Vec<Matching> {
    candidates
        .into_iter()
        .filter(|matching| equal_slots(matching, guess) == hits)
        .collect()
}

// ---------------------------- Guess construction -------------------------

/// Builds the guess-night matching: weighted greedy bipartite assignment.
///
/// Every (row, col) pair is scored as its candidate count plus a uniform
/// jitter from `[0, jitter)`, then pairs are committed in descending score
/// order whenever both ends are still free. All `n*n` pairs are scored, so a
/// complete bijection always falls out; anything short of one is a defect.
pub fn pick_guess(
    num_couples: usize,
    candidates: &[Matching],
    jitter: f64,
    rng: &mut impl Rng,
) -> Result<Matching, EngineError> {
    let counts = pair_counts(num_couples, candidates);

    let mut heap = BinaryHeap::with_capacity(num_couples * num_couples);
    for row in 0..num_couples {
        for col in 0..num_couples {
            let mut score = counts[row][col] as f64;
            if jitter > 0.0 {
                score += rng.random_range(0.0..jitter);
            }
            heap.push((OrderedFloat(score), Reverse((row, col))));
        }
    }

    let mut guess: Matching = vec![!0; num_couples];
    let mut col_taken = vec![false; num_couples];
    let mut assigned = 0;
    while let Some((_, Reverse((row, col)))) = heap.pop() {
        if guess[row] == !0 && !col_taken[col] {
            guess[row] = col;
            col_taken[col] = true;
            assigned += 1;
            if assigned == num_couples {
                break;
            }
        }
    }

    if assigned < num_couples {
        return Err(EngineError::IncompleteGuess {
            unassigned: num_couples - assigned,
        });
    }
    Ok(guess)
}

// ------------------------------ Round executor ---------------------------

/// One elimination round: select a booth query, prune on its answer, build a
/// guess, prune on its hit count. Inserts the query into `checked`.
pub fn do_round(
    judge: &mut dyn Judge,
    checked: &mut Checked,
    candidates: Vec<Matching>,
    config: &StrategyConfig,
    rng: &mut impl Rng,
    round: usize,
) -> Result<Vec<Matching>, EngineError> {
    let n = judge.num_couples();
    let counts = pair_counts(n, &candidates);

    let (row, col) = if checked.is_empty() {
        match config.first_query {
            FirstQueryPolicy::ForcedCorrect => match judge.confirmed_pair(0) {
                Some(col) => (0, col),
                None => select_booth(&counts, checked).ok_or(EngineError::NoUntestedPair)?,
            },
            FirstQueryPolicy::Random => (rng.random_range(0..n), rng.random_range(0..n)),
        }
    } else {
        select_booth(&counts, checked).ok_or(EngineError::NoUntestedPair)?
    };
    checked.insert((row, col));

    let paired = judge.truth_booth(row, col);
    let after_booth = prune_booth(candidates, row, col, paired);
    if after_booth.is_empty() {
        return Err(EngineError::EmptyCandidates { round });
    }

    let guess = pick_guess(n, &after_booth, config.jitter, rng)?;
    let hits = judge.guess_night(&guess);
    let after_guess = prune_guess(after_booth, &guess, hits);
    if after_guess.is_empty() {
        return Err(EngineError::EmptyCandidates { round });
    }
    Ok(after_guess)
}

// ---------------------------- Convergence driver -------------------------

#[derive(Clone, Copy, Debug)]
pub struct RunOutcome {
    /// Exactly one candidate survived all rounds.
    pub solved: bool,
    /// Candidates left after the final round; 1 when solved.
    pub survivors: usize,
}

/// Runs one full elimination: `n` rounds starting from all `n!` matchings.
pub fn run(
    judge: &mut dyn Judge,
    config: &StrategyConfig,
    rng: &mut impl Rng,
) -> Result<RunOutcome, EngineError> {
    let n = judge.num_couples();
    let mut candidates = all_matchings(n);
    let mut checked = Checked::default();
    for round in 0..n {
        candidates = do_round(judge, &mut checked, candidates, config, rng, round)?;
    }
    Ok(RunOutcome {
        solved: candidates.len() == 1,
        survivors: candidates.len(),
    })
}
