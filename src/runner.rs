use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::game::{simulate_path, Path};
use crate::outcome::{CoinFlips, OutcomeSource};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// One independent trial of the game.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    /// 1-based position in the batch
    pub index: usize,
    pub path: Path,
    pub final_balance: f64,
    pub wins: u32,
    pub losses: u32,
}

impl TrialResult {
    fn from_path(index: usize, path: Path) -> Self {
        TrialResult {
            index,
            final_balance: path.final_balance(),
            wins: path.wins(),
            losses: path.losses(),
            path,
        }
    }

    pub fn trajectory(&self) -> &[f64] {
        self.path.balances()
    }

    /// Age label for every entry of the trajectory.
    pub fn ages(&self, start_age: u32) -> Vec<u32> {
        (0..self.path.balances().len())
            .map(|i| start_age + i as u32)
            .collect()
    }
}

/// All trials of one run, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationBatch {
    pub config: SimulationConfig,
    pub trials: Vec<TrialResult>,
}

impl SimulationBatch {
    pub fn final_balances(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.final_balance).collect()
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

/// Runs batches for a validated configuration.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Simulation { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every trial, drawing outcomes from `source` in order.
    pub fn run<S: OutcomeSource + ?Sized>(&self, source: &mut S) -> SimulationBatch {
        self.run_with_progress(source, |_| {})
    }

    /// Like [`Simulation::run`], calling `on_trial` after each trial completes.
    pub fn run_with_progress<S, F>(&self, source: &mut S, mut on_trial: F) -> SimulationBatch
    where
        S: OutcomeSource + ?Sized,
        F: FnMut(&TrialResult),
    {
        let c = &self.config;
        debug!(
            trials = c.trials,
            horizon = c.horizon,
            stake_fraction = c.stake_fraction,
            initial_balance = c.initial_balance,
            "Starting batch"
        );

        let mut trials = Vec::with_capacity(c.trials as usize);
        for index in 1..=c.trials as usize {
            let path = simulate_path(
                c.initial_balance,
                c.horizon,
                c.stake_fraction,
                &c.rules,
                source,
            );
            let trial = TrialResult::from_path(index, path);
            on_trial(&trial);
            trials.push(trial);
        }

        info!(
            trials = trials.len(),
            stake_fraction = c.stake_fraction,
            "Batch complete"
        );

        SimulationBatch {
            config: c.clone(),
            trials,
        }
    }

    /// Outcome source seeded from `config.seed`. Each call starts a fresh
    /// stream, so separate simulations never interleave their draws.
    pub fn seeded_source(&self) -> Result<CoinFlips<StdRng>, SimError> {
        CoinFlips::new(
            StdRng::seed_from_u64(self.config.seed),
            self.config.rules.win_probability,
        )
    }

    pub fn run_seeded(&self) -> Result<SimulationBatch, SimError> {
        let mut source = self.seeded_source()?;
        Ok(self.run(&mut source))
    }
}
