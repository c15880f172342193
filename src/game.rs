//! The betting game: one coin flip per period, applied to the staked part
//! of the balance.
//!
//! With stake fraction `f` the balance moves by `1 - f + f * m` where `m` is
//! the win or lose multiplier. Each period therefore scales the balance by a
//! fixed per-outcome factor, so the final balance depends only on how many
//! wins and losses occurred, not on their order.

use crate::outcome::{Outcome, OutcomeSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Probability that a flip is a win
    pub win_probability: f64,
    /// Applied to the stake on a win
    pub win_multiplier: f64,
    /// Applied to the stake on a loss
    pub lose_multiplier: f64,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            win_probability: 0.5,
            win_multiplier: 1.5,
            lose_multiplier: 0.6,
        }
    }
}

impl GameRules {
    pub fn multiplier(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Win => self.win_multiplier,
            Outcome::Lose => self.lose_multiplier,
        }
    }

    /// Factor applied to the whole balance for one period.
    pub fn step_multiplier(&self, outcome: Outcome, stake_fraction: f64) -> f64 {
        1.0 - stake_fraction + stake_fraction * self.multiplier(outcome)
    }

    /// Final balance implied by a win/loss count, independent of order.
    pub fn closed_form_final(
        &self,
        initial: f64,
        wins: u32,
        losses: u32,
        stake_fraction: f64,
    ) -> f64 {
        initial
            * pow_count(self.step_multiplier(Outcome::Win, stake_fraction), wins)
            * pow_count(self.step_multiplier(Outcome::Lose, stake_fraction), losses)
    }

    /// Arithmetic mean growth per period. Drives the mean of the batch.
    pub fn expected_step_multiplier(&self, stake_fraction: f64) -> f64 {
        let p = self.win_probability;
        p * self.step_multiplier(Outcome::Win, stake_fraction)
            + (1.0 - p) * self.step_multiplier(Outcome::Lose, stake_fraction)
    }

    /// Geometric mean growth per period. Drives the median of the batch.
    pub fn median_step_multiplier(&self, stake_fraction: f64) -> f64 {
        let p = self.win_probability;
        self.step_multiplier(Outcome::Win, stake_fraction).powf(p)
            * self
                .step_multiplier(Outcome::Lose, stake_fraction)
                .powf(1.0 - p)
    }
}

/// `base^count` without wrapping counts past `i32::MAX` into negative exponents.
fn pow_count(base: f64, count: u32) -> f64 {
    match i32::try_from(count) {
        Ok(n) => base.powi(n),
        Err(_) => base.powf(count as f64),
    }
}

/// Breakdown of one period's update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub stake: f64,
    pub reserve: f64,
    pub next_balance: f64,
}

/// Apply a known outcome to `balance`.
pub fn period_step(
    balance: f64,
    stake_fraction: f64,
    rules: &GameRules,
    outcome: Outcome,
) -> StepOutcome {
    let stake = balance * stake_fraction;
    let reserve = balance * (1.0 - stake_fraction);
    let stake_outcome = stake * rules.multiplier(outcome);
    StepOutcome {
        stake,
        reserve,
        next_balance: reserve + stake_outcome,
    }
}

/// Draw an outcome from `source` and apply it.
pub fn play_period<S: OutcomeSource + ?Sized>(
    balance: f64,
    stake_fraction: f64,
    rules: &GameRules,
    source: &mut S,
) -> (StepOutcome, Outcome) {
    let outcome = source.next_outcome();
    (period_step(balance, stake_fraction, rules, outcome), outcome)
}

/// One full trajectory, built only by [`simulate_path`], so `balances`
/// always holds the starting balance plus one entry per period.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    balances: Vec<f64>,
    outcomes: Vec<Outcome>,
    /// Amount put at risk in each period
    stakes: Vec<f64>,
}

impl Path {
    pub fn balances(&self) -> &[f64] {
        &self.balances
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn stakes(&self) -> &[f64] {
        &self.stakes
    }

    pub fn horizon(&self) -> usize {
        self.outcomes.len()
    }

    pub fn initial_balance(&self) -> f64 {
        self.balances.first().copied().unwrap_or(0.0)
    }

    pub fn final_balance(&self) -> f64 {
        self.balances.last().copied().unwrap_or(0.0)
    }

    pub fn wins(&self) -> u32 {
        self.outcomes.iter().filter(|o| o.is_win()).count() as u32
    }

    pub fn losses(&self) -> u32 {
        self.horizon() as u32 - self.wins()
    }

    pub fn total_return(&self) -> f64 {
        self.final_balance() - self.initial_balance()
    }

    pub fn percentage_return(&self) -> f64 {
        (self.final_balance() / self.initial_balance() - 1.0) * 100.0
    }
}

/// Run `horizon` periods starting from `initial`.
pub fn simulate_path<S: OutcomeSource + ?Sized>(
    initial: f64,
    horizon: u32,
    stake_fraction: f64,
    rules: &GameRules,
    source: &mut S,
) -> Path {
    let periods = horizon as usize;
    let mut balances = Vec::with_capacity(periods + 1);
    let mut outcomes = Vec::with_capacity(periods);
    let mut stakes = Vec::with_capacity(periods);

    let mut balance = initial;
    balances.push(balance);

    for _ in 0..periods {
        let (step, outcome) = play_period(balance, stake_fraction, rules, source);
        balance = step.next_balance;
        balances.push(balance);
        outcomes.push(outcome);
        stakes.push(step.stake);
    }

    Path {
        balances,
        outcomes,
        stakes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_count_beyond_i32_range() {
        let huge = i32::MAX as u32 + 10;
        assert_eq!(pow_count(1.0, huge), 1.0);
        assert_eq!(pow_count(0.5, huge), 0.0);
        assert!(pow_count(1.5, huge).is_infinite());
        assert_eq!(pow_count(2.0, 10), 1024.0);
    }
}
