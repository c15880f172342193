use crate::error::SimError;
use crate::game::GameRules;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The two stake-sizing variants of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Entire balance at risk every period
    #[value(name = "full")]
    FullStake,
    /// Half the balance at risk, the other half held back
    #[value(name = "partial")]
    PartialStake,
}

impl Strategy {
    pub fn all() -> Vec<Strategy> {
        vec![Strategy::FullStake, Strategy::PartialStake]
    }

    pub fn stake_fraction(&self) -> f64 {
        match self {
            Self::FullStake => 1.0,
            Self::PartialStake => 0.5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FullStake => "full_stake",
            Self::PartialStake => "partial_stake",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FullStake => "Bet 100% of balance each period",
            Self::PartialStake => "Bet 50% of balance each period",
        }
    }
}

/// What a run reports: one detailed path, or a distribution over many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    #[value(name = "single")]
    SinglePath,
    #[default]
    #[value(name = "batch")]
    Batch,
}

/// Cut-offs used by the aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Below this a trial counts as near-ruin
    pub near_ruin: f64,
    /// Above this a trial counts as high-value
    pub high_value: f64,
    /// Extra P(final > x) queries; the initial balance is always queried first
    pub probability: Vec<f64>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            near_ruin: 100.0,
            high_value: 10_000.0,
            probability: vec![100.0, 10_000.0],
        }
    }
}

impl Thresholds {
    /// Probability thresholds with the initial balance first, duplicates removed.
    pub fn probability_queries(&self, initial_balance: f64) -> Vec<f64> {
        let mut queries = vec![initial_balance];
        for &t in &self.probability {
            if !queries.contains(&t) {
                queries.push(t);
            }
        }
        queries
    }

    /// Effective `(near_ruin, high_value)` cut-offs for categorising final
    /// balances. Widened to include `initial_balance` so the moderate and
    /// profitable buckets stay well-formed when the initial balance lies
    /// outside the configured thresholds.
    pub fn category_bounds(&self, initial_balance: f64) -> (f64, f64) {
        (
            self.near_ruin.min(initial_balance),
            self.high_value.max(initial_balance),
        )
    }
}

/// Configuration shared by every trial of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_balance: f64,
    /// Number of periods per trial
    pub horizon: u32,
    pub trials: u32,
    /// Share of the current balance put at risk each period
    pub stake_fraction: f64,
    /// Age at period 0, used only to label periods
    pub start_age: u32,
    pub seed: u64,
    pub rules: GameRules,
    pub thresholds: Thresholds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_balance: 1000.0,
            horizon: 30,
            trials: 100,
            stake_fraction: Strategy::FullStake.stake_fraction(),
            start_age: 25,
            seed: 42,
            rules: GameRules::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl SimulationConfig {
    pub fn for_strategy(strategy: Strategy) -> Self {
        SimulationConfig {
            stake_fraction: strategy.stake_fraction(),
            ..SimulationConfig::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.stake_fraction = strategy.stake_fraction();
        self
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_horizon(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_initial_balance(mut self, initial_balance: f64) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Age label for a period index.
    pub fn age_at(&self, period: usize) -> u32 {
        self.start_age + period as u32
    }

    /// Check every field before any simulation work starts.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(SimError::invalid(
                "initial_balance",
                format!("must be a positive number, got {}", self.initial_balance),
            ));
        }
        if self.horizon == 0 {
            return Err(SimError::invalid("horizon", "must be at least 1 period"));
        }
        if self.trials == 0 {
            return Err(SimError::invalid("trials", "must be at least 1 trial"));
        }
        if !(self.stake_fraction > 0.0 && self.stake_fraction <= 1.0) {
            return Err(SimError::invalid(
                "stake_fraction",
                format!("must be in (0, 1], got {}", self.stake_fraction),
            ));
        }

        let p = self.rules.win_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(SimError::invalid(
                "win_probability",
                format!("must be in [0, 1], got {}", p),
            ));
        }
        if !self.rules.win_multiplier.is_finite() || self.rules.win_multiplier <= 0.0 {
            return Err(SimError::invalid(
                "win_multiplier",
                format!("must be positive, got {}", self.rules.win_multiplier),
            ));
        }
        if !self.rules.lose_multiplier.is_finite() || self.rules.lose_multiplier < 0.0 {
            return Err(SimError::invalid(
                "lose_multiplier",
                format!("must be non-negative, got {}", self.rules.lose_multiplier),
            ));
        }

        let t = &self.thresholds;
        if !t.near_ruin.is_finite() {
            return Err(SimError::invalid(
                "thresholds.near_ruin",
                format!("must be finite, got {}", t.near_ruin),
            ));
        }
        if !t.high_value.is_finite() || t.high_value < t.near_ruin {
            return Err(SimError::invalid(
                "thresholds.high_value",
                format!(
                    "must be at least near_ruin {}, got {}",
                    t.near_ruin, t.high_value
                ),
            ));
        }
        if t.probability.iter().any(|v| !v.is_finite()) {
            return Err(SimError::invalid(
                "thresholds.probability",
                "values must be finite",
            ));
        }

        Ok(())
    }

    /// Load and validate a TOML config file. Missing keys take defaults.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SimError::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            SimError::ConfigFile { message, .. } => SimError::ConfigFile {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, SimError> {
        let config: SimulationConfig =
            toml::from_str(contents).map_err(|e| SimError::ConfigFile {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_queries_lead_with_initial() {
        let t = Thresholds {
            probability: vec![100.0, 1000.0, 10_000.0],
            ..Thresholds::default()
        };
        assert_eq!(t.probability_queries(1000.0), vec![1000.0, 100.0, 10_000.0]);
    }

    #[test]
    fn age_labels_follow_start_age() {
        let config = SimulationConfig::default();
        assert_eq!(config.age_at(0), 25);
        assert_eq!(config.age_at(30), 55);
    }
}
