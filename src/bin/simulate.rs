use anyhow::bail;
use ayto::matching::MAX_COUPLES;
use ayto::sim::{SimOptions, estimate};
use ayto::solver::{FirstQueryPolicy, StrategyConfig};
use clap::Parser;

/// Estimates how often the elimination strategy uniquely identifies the
/// hidden matching, over many parallel Monte Carlo trials.
#[derive(Parser, Debug)]
struct Cli {
    /// Number of couples (the matching size)
    couples: usize,
    /// Number of independent simulation trials
    trials: usize,
    /// Worker threads (0 = available hardware parallelism)
    #[clap(long, short = 'j', default_value_t = 0)]
    threads: usize,
    /// Base seed for a reproducible estimate
    #[clap(long, short = 's')]
    seed: Option<u64>,
    /// What the first truth booth is spent on
    #[clap(long, value_enum, default_value_t = FirstQuery::ForcedCorrect)]
    first_query: FirstQuery,
    /// Upper bound of the random tie-breaking jitter in guess scores
    #[clap(long, default_value_t = 0.1)]
    jitter: f64,
    /// Emit the full report as JSON instead of the bare rate
    #[clap(long, default_value_t = false)]
    json: bool,
    /// Suppress the progress bar
    #[clap(long, short = 'q', default_value_t = false)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FirstQuery {
    /// Open with a pair the judge confirms in advance (self-play shortcut)
    ForcedCorrect,
    /// Open with a uniformly random pair
    Random,
}

impl From<FirstQuery> for FirstQueryPolicy {
    fn from(arg: FirstQuery) -> Self {
        match arg {
            FirstQuery::ForcedCorrect => FirstQueryPolicy::ForcedCorrect,
            FirstQuery::Random => FirstQueryPolicy::Random,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.couples == 0 {
        bail!("couples must be at least 1");
    }
    if cli.couples > MAX_COUPLES {
        bail!(
            "couples must be at most {} (the candidate space holds couples! matchings)",
            MAX_COUPLES
        );
    }
    if cli.trials == 0 {
        bail!("trials must be at least 1");
    }
    if !cli.jitter.is_finite() || cli.jitter < 0.0 {
        bail!("jitter must be a finite non-negative number");
    }

    let report = estimate(&SimOptions {
        num_couples: cli.couples,
        trials: cli.trials,
        threads: cli.threads,
        seed: cli.seed,
        strategy: StrategyConfig {
            first_query: cli.first_query.into(),
            jitter: cli.jitter,
        },
        progress: !cli.quiet,
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:.6}", report.rate);
    }
    Ok(())
}
