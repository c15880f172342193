use approx::assert_relative_eq;
use wager_sim::game::{period_step, play_period, simulate_path, GameRules};
use wager_sim::outcome::{Outcome, ScriptedOutcomes};

use Outcome::{Lose, Win};

fn scripted(outcomes: &[Outcome]) -> ScriptedOutcomes {
    ScriptedOutcomes::new(outcomes.to_vec()).unwrap()
}

#[test]
fn test_full_stake_step_multipliers() {
    let rules = GameRules::default();
    assert_eq!(rules.step_multiplier(Win, 1.0), 1.5);
    assert_eq!(rules.step_multiplier(Lose, 1.0), 0.6);

    let win = period_step(1000.0, 1.0, &rules, Win);
    assert_eq!(win.stake, 1000.0);
    assert_eq!(win.reserve, 0.0);
    assert_eq!(win.next_balance, 1500.0);

    let lose = period_step(1000.0, 1.0, &rules, Lose);
    assert_relative_eq!(lose.next_balance, 600.0, max_relative = 1e-12);
}

#[test]
fn test_partial_stake_step_multipliers() {
    // 50% staked: 1 - 0.5 + 0.5 * 1.5 = 1.25 and 1 - 0.5 + 0.5 * 0.6 = 0.8
    let rules = GameRules::default();
    assert_relative_eq!(rules.step_multiplier(Win, 0.5), 1.25, max_relative = 1e-12);
    assert_relative_eq!(rules.step_multiplier(Lose, 0.5), 0.8, max_relative = 1e-12);

    let step = period_step(1000.0, 0.5, &rules, Win);
    assert_eq!(step.stake, 500.0);
    assert_eq!(step.reserve, 500.0);
    assert_eq!(step.next_balance, 1250.0);

    let step = period_step(1000.0, 0.5, &rules, Lose);
    assert_relative_eq!(step.next_balance, 800.0, max_relative = 1e-12);
}

#[test]
fn test_play_period_draws_from_source() {
    let rules = GameRules::default();
    let mut src = scripted(&[Lose]);
    let (step, outcome) = play_period(2000.0, 1.0, &rules, &mut src);
    assert_eq!(outcome, Lose);
    assert_relative_eq!(step.next_balance, 1200.0, max_relative = 1e-12);
    assert_eq!(src.drawn(), 1);
}

#[test]
fn test_full_stake_win_then_lose() {
    let rules = GameRules::default();
    let path = simulate_path(1000.0, 2, 1.0, &rules, &mut scripted(&[Win, Lose]));

    assert_eq!(path.balances().len(), 3);
    assert_eq!(path.balances()[0], 1000.0);
    assert_eq!(path.balances()[1], 1500.0);
    assert_relative_eq!(path.balances()[2], 900.0, max_relative = 1e-12);
    assert_eq!(path.outcomes(), vec![Win, Lose]);
    assert_eq!(path.stakes(), vec![1000.0, 1500.0]);
}

#[test]
fn test_partial_stake_win_then_lose() {
    let rules = GameRules::default();
    let path = simulate_path(1000.0, 2, 0.5, &rules, &mut scripted(&[Win, Lose]));

    assert_eq!(path.balances()[0], 1000.0);
    assert_eq!(path.balances()[1], 1250.0);
    assert_relative_eq!(path.balances()[2], 1000.0, max_relative = 1e-12);
    assert_eq!(path.stakes(), vec![500.0, 625.0]);
}

#[test]
fn test_path_lengths_match_horizon() {
    let rules = GameRules::default();
    for horizon in [1u32, 2, 7, 30] {
        let path = simulate_path(
            1000.0,
            horizon,
            0.5,
            &rules,
            &mut scripted(&[Win, Lose, Lose]),
        );
        assert_eq!(path.balances().len(), horizon as usize + 1);
        assert_eq!(path.outcomes().len(), horizon as usize);
        assert_eq!(path.stakes().len(), horizon as usize);
        assert_eq!(path.horizon(), horizon as usize);
        assert_eq!(path.wins() + path.losses(), horizon);
    }
}

#[test]
fn test_final_balance_is_order_independent() {
    let rules = GameRules::default();
    let orderings: [&[Outcome]; 4] = [
        &[Win, Win, Win, Lose, Lose],
        &[Lose, Lose, Win, Win, Win],
        &[Win, Lose, Win, Lose, Win],
        &[Lose, Win, Lose, Win, Win],
    ];

    for fraction in [1.0, 0.5] {
        let expected = rules.closed_form_final(1000.0, 3, 2, fraction);
        for order in orderings {
            let path = simulate_path(1000.0, 5, fraction, &rules, &mut scripted(order));
            assert_eq!(path.wins(), 3);
            assert_eq!(path.losses(), 2);
            assert_relative_eq!(path.final_balance(), expected, max_relative = 1e-12);
        }
    }
}

#[test]
fn test_closed_form_matches_known_factors() {
    let rules = GameRules::default();
    // 1.5^3 * 0.6^2 = 1.215
    assert_relative_eq!(
        rules.closed_form_final(1000.0, 3, 2, 1.0),
        1215.0,
        max_relative = 1e-12
    );
    // 1.25^3 * 0.8^2 = 1.25
    assert_relative_eq!(
        rules.closed_form_final(1000.0, 3, 2, 0.5),
        1250.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_closed_form_with_counts_past_i32_max() {
    let rules = GameRules::default();
    let huge = i32::MAX as u32 + 1;
    assert!(rules.closed_form_final(1000.0, huge, 0, 1.0).is_infinite());
    assert_eq!(rules.closed_form_final(1000.0, 0, huge, 1.0), 0.0);
}

#[test]
fn test_mean_and_median_growth() {
    let rules = GameRules::default();
    // Full stake: mean 1.05, geometric sqrt(0.9) ~ 0.9487
    assert_relative_eq!(rules.expected_step_multiplier(1.0), 1.05, max_relative = 1e-12);
    assert_relative_eq!(
        rules.median_step_multiplier(1.0),
        0.9_f64.sqrt(),
        max_relative = 1e-12
    );
    // Half stake: mean 1.025, geometric sqrt(1.0) = 1.0
    assert_relative_eq!(rules.expected_step_multiplier(0.5), 1.025, max_relative = 1e-12);
    assert_relative_eq!(rules.median_step_multiplier(0.5), 1.0, max_relative = 1e-12);
}

#[test]
fn test_returns() {
    let rules = GameRules::default();
    let path = simulate_path(1000.0, 1, 1.0, &rules, &mut scripted(&[Win]));
    assert_eq!(path.total_return(), 500.0);
    assert_relative_eq!(path.percentage_return(), 50.0, max_relative = 1e-12);
}
