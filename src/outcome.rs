use crate::error::SimError;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};

/// Result of a single coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Lose => "lose",
        }
    }
}

/// Anything that can hand the engine the next outcome.
///
/// The engine never reaches for a global generator; every draw goes through
/// a source owned by the caller, so a run is reproducible from its source.
pub trait OutcomeSource {
    fn next_outcome(&mut self) -> Outcome;
}

impl<S: OutcomeSource + ?Sized> OutcomeSource for &mut S {
    fn next_outcome(&mut self) -> Outcome {
        (**self).next_outcome()
    }
}

/// Bernoulli draws from a `rand` generator.
#[derive(Debug, Clone)]
pub struct CoinFlips<R: Rng> {
    rng: R,
    dist: Bernoulli,
}

impl<R: Rng> CoinFlips<R> {
    pub fn new(rng: R, win_probability: f64) -> Result<Self, SimError> {
        let dist = Bernoulli::new(win_probability)
            .map_err(|e| SimError::invalid("win_probability", e.to_string()))?;
        Ok(CoinFlips { rng, dist })
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> OutcomeSource for CoinFlips<R> {
    fn next_outcome(&mut self) -> Outcome {
        if self.dist.sample(&mut self.rng) {
            Outcome::Win
        } else {
            Outcome::Lose
        }
    }
}

/// Replays a fixed outcome sequence, wrapping around when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedOutcomes {
    script: Vec<Outcome>,
    cursor: usize,
}

impl ScriptedOutcomes {
    /// Returns `None` for an empty script.
    pub fn new(script: Vec<Outcome>) -> Option<Self> {
        if script.is_empty() {
            return None;
        }
        Some(ScriptedOutcomes { script, cursor: 0 })
    }

    /// Number of outcomes handed out so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl OutcomeSource for ScriptedOutcomes {
    fn next_outcome(&mut self) -> Outcome {
        let outcome = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        outcome
    }
}
