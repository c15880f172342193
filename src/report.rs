//! Plain-text reports for the console.
//!
//! Every function returns a `String` so the caller decides where it goes.

use crate::config::SimulationConfig;
use crate::game::GameRules;
use crate::outcome::Outcome;
use crate::runner::{SimulationBatch, TrialResult};
use crate::stats::BatchStatistics;
use std::fmt::Write;

const RULE_WIDTH: usize = 80;

/// Reference figures from an earlier run, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub label: &'static str,
    pub above_initial: f64,
    pub above_high_value: f64,
}

fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", rule('='));
}

/// Format a dollar amount with thousands separators, e.g. `$12,345.68`.
pub fn money(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("${}", value);
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // Sign follows the rounded digits, so -0.4 renders as $0.
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}${}.{}", sign, grouped, f),
        None => format!("{}${}", sign, grouped),
    }
}

fn outcome_label(outcome: Outcome, rules: &GameRules) -> String {
    let pct = (rules.multiplier(outcome) - 1.0) * 100.0;
    match outcome {
        Outcome::Win => format!("Win ({:+.0}%)", pct),
        Outcome::Lose => format!("Lose ({:+.0}%)", pct),
    }
}

/// Period-by-period report for a single trial.
pub fn format_path_report(trial: &TrialResult, config: &SimulationConfig) -> String {
    let mut out = String::new();
    let path = &trial.path;
    heading(&mut out, "SINGLE SIMULATION RESULTS");

    let _ = writeln!(out, "Stake Fraction: {:.0}%", config.stake_fraction * 100.0);
    let _ = writeln!(out, "Initial Balance: {}", money(path.initial_balance(), 2));
    let _ = writeln!(out, "Final Balance: {}", money(path.final_balance(), 2));
    let _ = writeln!(out, "Total Return: {}", money(path.total_return(), 2));
    let _ = writeln!(out, "Percentage Return: {:.2}%", path.percentage_return());
    let _ = writeln!(
        out,
        "Wins: {} out of {} periods ({:.1}%)",
        trial.wins,
        path.horizon(),
        trial.wins as f64 / path.horizon().max(1) as f64 * 100.0
    );
    let _ = writeln!(out, "Losses: {} out of {} periods", trial.losses, path.horizon());

    let _ = writeln!(out);
    let _ = writeln!(out, "Year-by-Year Results:");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for (i, balance) in path.balances().iter().enumerate() {
        let age = config.age_at(i);
        if i == 0 {
            let _ = writeln!(out, "Age {}: {} (Initial)", age, money(*balance, 2));
        } else {
            let _ = writeln!(
                out,
                "Age {}: {} ({}, staked {})",
                age,
                money(*balance, 2),
                outcome_label(path.outcomes()[i - 1], &config.rules),
                money(path.stakes()[i - 1], 2)
            );
        }
    }
    out
}

/// Distribution summary for a batch.
pub fn format_batch_report(label: &str, stats: &BatchStatistics, config: &SimulationConfig) -> String {
    let mut out = String::new();
    heading(
        &mut out,
        &format!("{} SIMULATIONS RESULTS: {}", stats.trials, label),
    );

    let n = stats.trials as f64;
    let _ = writeln!(out, "Stake Fraction: {:.0}%", config.stake_fraction * 100.0);
    let _ = writeln!(out, "Number of Simulations: {}", stats.trials);
    let _ = writeln!(out, "Periods per Simulation: {}", config.horizon);
    let _ = writeln!(out, "Initial Balance: {}", money(stats.initial_balance, 2));
    let _ = writeln!(out, "Mean Final Balance: {}", money(stats.mean, 2));
    let _ = writeln!(out, "Median Final Balance: {}", money(stats.median, 2));
    let _ = writeln!(out, "Standard Deviation: {}", money(stats.std_dev, 2));
    let _ = writeln!(out, "Minimum Final Balance: {}", money(stats.min, 2));
    let _ = writeln!(out, "Maximum Final Balance: {}", money(stats.max, 2));

    let _ = writeln!(out);
    let _ = writeln!(out, "Probability Analysis:");
    for tp in &stats.threshold_probabilities {
        let _ = writeln!(
            out,
            "P(Balance > {}): {:.1}%",
            money(tp.threshold, 0),
            tp.probability * 100.0
        );
    }

    let c = &stats.categories;
    let (lo, hi) = config.thresholds.category_bounds(stats.initial_balance);
    let _ = writeln!(out);
    let _ = writeln!(out, "Outcome Categories:");
    let rows = [
        (format!("High Value (>{})", money(hi, 0)), c.high_value),
        (
            format!(
                "Profitable ({}-{})",
                money(stats.initial_balance, 0),
                money(hi, 0)
            ),
            c.profitable,
        ),
        (
            format!(
                "Moderate ({}-{})",
                money(lo, 0),
                money(stats.initial_balance, 0)
            ),
            c.moderate,
        ),
        (format!("Near Ruin (<{})", money(lo, 0)), c.near_ruin),
    ];
    for (name, count) in rows {
        let _ = writeln!(
            out,
            "{}: {} simulations ({:.1}%)",
            name,
            count,
            count as f64 / n * 100.0
        );
    }

    let f = config.stake_fraction;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Per-period growth: mean x{:.4}, typical (geometric) x{:.4}",
        config.rules.expected_step_multiplier(f),
        config.rules.median_step_multiplier(f)
    );
    out
}

/// The first `n` trials of a batch, one line each.
pub fn format_trial_listing(batch: &SimulationBatch, n: usize) -> String {
    let mut out = String::new();
    let shown = n.min(batch.len());
    let _ = writeln!(out, "First {} Simulation Results:", shown);
    let _ = writeln!(out, "{}", "-".repeat(60));
    for t in batch.trials.iter().take(shown) {
        let _ = writeln!(
            out,
            "Sim {:>3}: {:>14} (W:{:>2}, L:{:>2})",
            t.index,
            money(t.final_balance, 2),
            t.wins,
            t.losses
        );
    }
    out
}

/// Side-by-side comparison of two labelled batches.
pub fn format_comparison(left: (&str, &BatchStatistics), right: (&str, &BatchStatistics)) -> String {
    let (l_name, l) = left;
    let (r_name, r) = right;
    let mut out = String::new();
    heading(&mut out, "STRATEGY COMPARISON");

    let _ = writeln!(out, "{:<24} {:>20} {:>20}", "", l_name, r_name);
    let money_rows = [
        ("Mean", l.mean, r.mean),
        ("Median", l.median, r.median),
        ("Std Dev", l.std_dev, r.std_dev),
        ("Min", l.min, r.min),
        ("Max", l.max, r.max),
    ];
    for (name, a, b) in money_rows {
        let _ = writeln!(out, "{:<24} {:>20} {:>20}", name, money(a, 2), money(b, 2));
    }

    for tp in &l.threshold_probabilities {
        let other = r
            .probability_above(tp.threshold)
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<24} {:>20} {:>20}",
            format!("P(> {})", money(tp.threshold, 0)),
            format!("{:.1}%", tp.probability * 100.0),
            other
        );
    }

    let _ = writeln!(
        out,
        "{:<24} {:>20} {:>20}",
        "Near ruin", l.categories.near_ruin, r.categories.near_ruin
    );
    let _ = writeln!(
        out,
        "{:<24} {:>20} {:>20}",
        "Above initial",
        l.categories.above_initial(),
        r.categories.above_initial()
    );
    out
}

fn verdict(current: f64, reference: f64) -> &'static str {
    if current > reference {
        "HIGHER"
    } else if current < reference {
        "LOWER"
    } else {
        "EQUAL"
    }
}

/// Compare a batch against caller-supplied reference probabilities.
pub fn format_baseline_comparison(
    stats: &BatchStatistics,
    high_value: f64,
    baseline: &Baseline,
) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("COMPARISON WITH {}", baseline.label.to_uppercase()));

    let above_initial = stats
        .probability_above_initial()
        .unwrap_or(stats.categories.above_initial() as f64 / stats.trials as f64);
    let above_high = stats.categories.high_value as f64 / stats.trials as f64;

    let rows = [
        (
            format!("P(Balance > {})", money(stats.initial_balance, 0)),
            above_initial,
            baseline.above_initial,
        ),
        (
            format!("P(Balance > {})", money(high_value, 0)),
            above_high,
            baseline.above_high_value,
        ),
    ];
    for (name, current, reference) in rows {
        let _ = writeln!(
            out,
            "{}: {:.1}% vs {:.1}% ({})",
            name,
            current * 100.0,
            reference * 100.0,
            verdict(current, reference)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0, 2), "$0.00");
        assert_eq!(money(999.6, 0), "$1,000");
        assert_eq!(money(1234567.891, 2), "$1,234,567.89");
        assert_eq!(money(-1500.0, 0), "-$1,500");
        assert_eq!(money(100.0, 0), "$100");
    }

    #[test]
    fn money_drops_sign_when_rounded_to_zero() {
        assert_eq!(money(-0.4, 0), "$0");
        assert_eq!(money(-0.004, 2), "$0.00");
        assert_eq!(money(-0.6, 0), "-$1");
        assert_eq!(money(-0.005001, 2), "-$0.01");
    }

    #[test]
    fn outcome_labels_show_percent_change() {
        let rules = GameRules::default();
        assert_eq!(outcome_label(Outcome::Win, &rules), "Win (+50%)");
        assert_eq!(outcome_label(Outcome::Lose, &rules), "Lose (-40%)");
    }
}
