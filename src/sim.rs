//! # Simulation Harness
//!
//! Fork-join Monte Carlo: trials are split into per-worker batches, each
//! worker thread runs its batch sequentially with a private RNG stream, and
//! the successes are summed after all workers finish. Workers share nothing
//! mutable except the progress bar.

use crate::judge::LocalJudge;
use crate::solver::{EngineError, StrategyConfig, run};
use indicatif::ProgressBar;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use serde::Serialize;
use std::thread;

#[derive(Clone, Copy, Debug)]
pub struct SimOptions {
    pub num_couples: usize,
    pub trials: usize,
    /// Worker threads; 0 means available hardware parallelism.
    pub threads: usize,
    /// Base seed for reproducible estimates; drawn from the OS when absent.
    pub seed: Option<u64>,
    pub strategy: StrategyConfig,
    /// Show a progress bar on stderr while trials run.
    pub progress: bool,
}

/// Aggregated result of one estimation; serializes to the `--json` report.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Report {
    pub couples: usize,
    pub trials: usize,
    pub successes: usize,
    pub rate: f64,
    /// Base seed actually used; echoed so any run can be replayed.
    pub seed: u64,
    pub threads: usize,
}

/// Runs `opts.trials` independent eliminations and estimates the probability
/// that the strategy converges to the unique hidden matching.
///
/// Worker `i` owns `ChaCha12Rng` stream `seed + i`; each trial draws a fresh
/// hidden matching from that stream and plays one full run against it, so
/// the estimate is deterministic for a fixed seed regardless of scheduling.
pub fn estimate(opts: &SimOptions) -> Result<Report, EngineError> {
    assert!(opts.trials > 0, "trials must be positive");

    let threads = if opts.threads == 0 {
        thread::available_parallelism().map_or(1, |p| p.get())
    } else {
        opts.threads
    };
    let seed = opts.seed.unwrap_or_else(|| rand::rng().random());
    let per_worker = opts.trials.div_ceil(threads);

    let bar = if opts.progress {
        eprintln!("{} workers, up to {} trials each", threads, per_worker);
        ProgressBar::new(opts.trials as u64)
    } else {
        ProgressBar::hidden()
    };

    let mut handles = Vec::with_capacity(threads);
    let mut remaining = opts.trials;
    for tid in 0..threads {
        let batch = remaining.min(per_worker);
        remaining -= batch;
        if batch == 0 {
            break;
        }
        let num_couples = opts.num_couples;
        let strategy = opts.strategy;
        let bar = bar.clone();
        handles.push(thread::spawn(move || -> Result<usize, EngineError> {
            let mut rng = ChaCha12Rng::seed_from_u64(seed.wrapping_add(tid as u64));
            let mut good = 0;
            for _ in 0..batch {
                let mut judge = LocalJudge::new(num_couples, rng.random());
                if run(&mut judge, &strategy, &mut rng)?.solved {
                    good += 1;
                }
                bar.inc(1);
            }
            Ok(good)
        }));
    }

    let mut successes = 0;
    for handle in handles {
        successes += handle.join().expect("worker thread panicked")?;
    }
    bar.finish_and_clear();

    Ok(Report {
        couples: opts.num_couples,
        trials: opts.trials,
        successes,
        rate: successes as f64 / opts.trials as f64,
        seed,
        threads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::FirstQueryPolicy;

    fn opts(num_couples: usize, trials: usize, seed: u64) -> SimOptions {
        SimOptions {
            num_couples,
            trials,
            threads: 2,
            seed: Some(seed),
            strategy: StrategyConfig::default(),
            progress: false,
        }
    }

    #[test]
    fn test_single_couple_always_succeeds() {
        let report = estimate(&opts(1, 64, 7)).unwrap();
        assert_eq!(report.successes, 64);
        assert_eq!(report.rate, 1.0);
    }

    #[test]
    fn test_two_couples_one_booth_disambiguates() {
        for policy in [FirstQueryPolicy::ForcedCorrect, FirstQueryPolicy::Random] {
            let mut opts = opts(2, 100, 11);
            opts.strategy.first_query = policy;
            let report = estimate(&opts).unwrap();
            assert_eq!(report.rate, 1.0, "policy {:?}", policy);
        }
    }

    #[test]
    fn test_fixed_seed_reproducible() {
        let a = estimate(&opts(4, 48, 0xC0FF_EE42)).unwrap();
        let b = estimate(&opts(4, 48, 0xC0FF_EE42)).unwrap();
        assert_eq!(a.successes, b.successes);
        assert_eq!(a.seed, b.seed);
    }

    #[test]
    fn test_four_couples_estimate_stable_across_seeds() {
        // Statistical regression, not an exact-value check: two estimates of
        // the same probability from disjoint seeds must agree within a
        // margin far wider than the sampling noise at 300 trials.
        let a = estimate(&opts(4, 300, 1)).unwrap();
        let b = estimate(&opts(4, 300, 2_000_000)).unwrap();
        assert!((a.rate - b.rate).abs() < 0.25, "{} vs {}", a.rate, b.rate);
    }

    #[test]
    fn test_rate_is_a_probability() {
        let report = estimate(&opts(4, 40, 3)).unwrap();
        assert!(report.successes <= report.trials);
        assert!((0.0..=1.0).contains(&report.rate));
    }

    #[test]
    fn test_more_workers_than_trials() {
        let report = estimate(&SimOptions {
            threads: 8,
            ..opts(3, 3, 5)
        })
        .unwrap();
        assert_eq!(report.trials, 3);
        assert!((0.0..=1.0).contains(&report.rate));
    }
}
