use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use wager_sim::config::{OutputMode, SimulationConfig, Strategy};
use wager_sim::error::SimError;
use wager_sim::output;
use wager_sim::report::{self, Baseline};
use wager_sim::runner::{Simulation, SimulationBatch};
use wager_sim::stats::{self, BatchStatistics};

#[derive(Parser)]
#[command(
    name = "wager-sim",
    about = "Monte Carlo simulator for a repeated coin-flip betting game"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct CommonArgs {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of trials
    #[arg(long)]
    trials: Option<u32>,

    /// Periods per trial
    #[arg(long)]
    horizon: Option<u32>,

    /// Starting balance
    #[arg(long)]
    initial: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for CSV / JSON / TOML output
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one strategy, as a single detailed path or a batch
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Stake sizing variant
        #[arg(long, value_enum, default_value = "full")]
        strategy: Strategy,

        /// Report one path in detail, or the distribution over all trials
        #[arg(long, value_enum, default_value = "batch")]
        mode: OutputMode,

        /// Number of individual trials to list after a batch report
        #[arg(long, default_value = "10")]
        list: usize,

        /// Reference P(final > initial) to compare against
        #[arg(long, requires = "baseline_above_high")]
        baseline_above_initial: Option<f64>,

        /// Reference P(final > high-value threshold) to compare against
        #[arg(long, requires = "baseline_above_initial")]
        baseline_above_high: Option<f64>,
    },

    /// Run both strategies with the same settings and compare them
    Compare {
        #[command(flatten)]
        common: CommonArgs,
    },
}

fn build_config(common: &CommonArgs, strategy: Strategy) -> Result<SimulationConfig, SimError> {
    let mut config = match &common.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    config = config.with_strategy(strategy);
    if let Some(trials) = common.trials {
        config = config.with_trials(trials);
    }
    if let Some(horizon) = common.horizon {
        config = config.with_horizon(horizon);
    }
    if let Some(initial) = common.initial {
        config = config.with_initial_balance(initial);
    }
    if let Some(seed) = common.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn run_with_bar(simulation: &Simulation) -> Result<SimulationBatch, SimError> {
    let bar = ProgressBar::new(simulation.config().trials as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} trials")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    let mut source = simulation.seeded_source()?;
    let batch = simulation.run_with_progress(&mut source, |_| bar.inc(1));
    bar.finish_and_clear();
    Ok(batch)
}

fn save_outputs(batch: &SimulationBatch, stats: &BatchStatistics, dir: &Path) {
    match output::save_all(batch, stats, dir) {
        Ok(()) => info!(dir = %dir.display(), "Saved outputs"),
        Err(e) => error!(dir = %dir.display(), "Error saving outputs: {}", e),
    }
}

fn run_command(
    common: &CommonArgs,
    strategy: Strategy,
    mode: OutputMode,
    list: usize,
    baseline: Option<Baseline>,
) -> Result<(), SimError> {
    let mut config = build_config(common, strategy)?;
    if mode == OutputMode::SinglePath {
        config = config.with_trials(1);
    }

    let simulation = Simulation::new(config)?;
    info!(
        strategy = strategy.name(),
        trials = simulation.config().trials,
        horizon = simulation.config().horizon,
        seed = simulation.config().seed,
        "{}",
        strategy.description()
    );

    let batch = match mode {
        OutputMode::SinglePath => simulation.run_seeded()?,
        OutputMode::Batch => run_with_bar(&simulation)?,
    };
    let stats = stats::compute_statistics(&batch)?;

    match mode {
        OutputMode::SinglePath => {
            // Trials was forced to 1, so the first trial always exists.
            if let Some(trial) = batch.trials.first() {
                print!("{}", report::format_path_report(trial, &batch.config));
            }
        }
        OutputMode::Batch => {
            print!(
                "{}",
                report::format_batch_report(strategy.description(), &stats, &batch.config)
            );
            if list > 0 {
                println!();
                print!("{}", report::format_trial_listing(&batch, list));
            }
            if let Some(baseline) = baseline {
                println!();
                print!(
                    "{}",
                    report::format_baseline_comparison(
                        &stats,
                        batch.config.thresholds.high_value,
                        &baseline
                    )
                );
            }
        }
    }

    if let Some(dir) = &common.output_dir {
        save_outputs(&batch, &stats, &dir.join(strategy.name()));
    }
    Ok(())
}

fn compare_command(common: &CommonArgs) -> Result<(), SimError> {
    let mut results = Vec::new();
    for strategy in Strategy::all() {
        let simulation = Simulation::new(build_config(common, strategy)?)?;
        info!(strategy = strategy.name(), "Running strategy");
        let batch = run_with_bar(&simulation)?;
        let stats = stats::compute_statistics(&batch)?;
        if let Some(dir) = &common.output_dir {
            save_outputs(&batch, &stats, &dir.join(strategy.name()));
        }
        results.push((strategy, batch, stats));
    }

    for (strategy, batch, stats) in &results {
        print!(
            "{}",
            report::format_batch_report(strategy.description(), stats, &batch.config)
        );
        println!();
    }

    if let [(l_strategy, _, l_stats), (r_strategy, _, r_stats)] = results.as_slice() {
        print!(
            "{}",
            report::format_comparison(
                (l_strategy.name(), l_stats),
                (r_strategy.name(), r_stats)
            )
        );
    }
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wager_sim=info"));

    if std::env::var("WAGER_SIM_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            common,
            strategy,
            mode,
            list,
            baseline_above_initial,
            baseline_above_high,
        } => {
            let baseline = match (baseline_above_initial, baseline_above_high) {
                (Some(above_initial), Some(above_high_value)) => Some(Baseline {
                    label: "baseline",
                    above_initial,
                    above_high_value,
                }),
                _ => None,
            };
            run_command(&common, strategy, mode, list, baseline)
        }
        Commands::Compare { common } => compare_command(&common),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
