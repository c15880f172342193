use crate::config::Thresholds;
use crate::error::SimError;
use crate::runner::SimulationBatch;
use serde::Serialize;

/// P(final balance > threshold) over a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdProbability {
    pub threshold: f64,
    pub probability: f64,
}

/// Mutually exclusive buckets covering every trial. The cut-offs are
/// [`Thresholds::category_bounds`], so `near_ruin` below never exceeds the
/// initial balance and `high_value` never falls short of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeCategories {
    /// final < near_ruin
    pub near_ruin: usize,
    /// near_ruin <= final <= initial
    pub moderate: usize,
    /// initial < final <= high_value
    pub profitable: usize,
    /// final > high_value
    pub high_value: usize,
}

impl OutcomeCategories {
    pub fn total(&self) -> usize {
        self.near_ruin + self.moderate + self.profitable + self.high_value
    }

    /// Every trial that ended above the initial balance.
    pub fn above_initial(&self) -> usize {
        self.profitable + self.high_value
    }
}

/// Distribution summary of a batch's final balances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStatistics {
    pub trials: usize,
    pub initial_balance: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub threshold_probabilities: Vec<ThresholdProbability>,
    pub categories: OutcomeCategories,
}

impl BatchStatistics {
    pub fn from_final_balances(
        balances: &[f64],
        initial_balance: f64,
        thresholds: &Thresholds,
    ) -> Result<Self, SimError> {
        if balances.is_empty() {
            return Err(SimError::EmptyBatch);
        }

        let n = balances.len() as f64;
        let mean = balances.iter().sum::<f64>() / n;
        let variance = balances.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = balances.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let threshold_probabilities = thresholds
            .probability_queries(initial_balance)
            .into_iter()
            .map(|threshold| ThresholdProbability {
                threshold,
                probability: fraction_above(balances, threshold),
            })
            .collect();

        Ok(BatchStatistics {
            trials: balances.len(),
            initial_balance,
            mean,
            median: median(&sorted),
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            threshold_probabilities,
            categories: categorize(balances, initial_balance, thresholds),
        })
    }

    /// Looks up a threshold that was queried when the statistics were built.
    pub fn probability_above(&self, threshold: f64) -> Option<f64> {
        self.threshold_probabilities
            .iter()
            .find(|tp| tp.threshold == threshold)
            .map(|tp| tp.probability)
    }

    /// `None` only for statistics assembled by hand without the initial query.
    pub fn probability_above_initial(&self) -> Option<f64> {
        self.probability_above(self.initial_balance)
    }
}

/// Summary statistics for a batch, using the batch's own configuration.
pub fn compute_statistics(batch: &SimulationBatch) -> Result<BatchStatistics, SimError> {
    BatchStatistics::from_final_balances(
        &batch.final_balances(),
        batch.config.initial_balance,
        &batch.config.thresholds,
    )
}

/// Mean number of winning periods per trial.
pub fn mean_wins(batch: &SimulationBatch) -> Result<f64, SimError> {
    if batch.is_empty() {
        return Err(SimError::EmptyBatch);
    }
    let total: u64 = batch.trials.iter().map(|t| t.wins as u64).sum();
    Ok(total as f64 / batch.len() as f64)
}

fn fraction_above(balances: &[f64], threshold: f64) -> f64 {
    balances.iter().filter(|&&b| b > threshold).count() as f64 / balances.len() as f64
}

fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn categorize(balances: &[f64], initial_balance: f64, thresholds: &Thresholds) -> OutcomeCategories {
    let mut cats = OutcomeCategories {
        near_ruin: 0,
        moderate: 0,
        profitable: 0,
        high_value: 0,
    };
    let (lo, hi) = thresholds.category_bounds(initial_balance);
    for &b in balances {
        if b < lo {
            cats.near_ruin += 1;
        } else if b <= initial_balance {
            cats.moderate += 1;
        } else if b <= hi {
            cats.profitable += 1;
        } else {
            cats.high_value += 1;
        }
    }
    cats
}
