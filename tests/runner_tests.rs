use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wager_sim::config::{SimulationConfig, Strategy};
use wager_sim::error::SimError;
use wager_sim::outcome::{CoinFlips, Outcome, ScriptedOutcomes};
use wager_sim::runner::Simulation;

fn config(strategy: Strategy, trials: u32, horizon: u32) -> SimulationConfig {
    SimulationConfig::for_strategy(strategy)
        .with_trials(trials)
        .with_horizon(horizon)
}

#[test]
fn test_three_single_period_trials() {
    let sim = Simulation::new(config(Strategy::FullStake, 3, 1)).unwrap();
    let mut src =
        ScriptedOutcomes::new(vec![Outcome::Win, Outcome::Lose, Outcome::Win]).unwrap();
    let batch = sim.run(&mut src);

    assert_eq!(batch.len(), 3);
    let finals = batch.final_balances();
    assert_eq!(finals[0], 1500.0);
    assert_relative_eq!(finals[1], 600.0, max_relative = 1e-12);
    assert_eq!(finals[2], 1500.0);

    let indices: Vec<usize> = batch.trials.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert_eq!(batch.trials[1].wins, 0);
    assert_eq!(batch.trials[1].losses, 1);
}

#[test]
fn test_trials_consume_source_in_order() {
    let sim = Simulation::new(config(Strategy::PartialStake, 2, 2)).unwrap();
    let mut src = ScriptedOutcomes::new(vec![
        Outcome::Win,
        Outcome::Lose,
        Outcome::Lose,
        Outcome::Lose,
    ])
    .unwrap();
    let batch = sim.run(&mut src);

    assert_eq!(src.drawn(), 4);
    assert_eq!(batch.trials[0].path.outcomes(), vec![Outcome::Win, Outcome::Lose]);
    assert_eq!(batch.trials[1].path.outcomes(), vec![Outcome::Lose, Outcome::Lose]);
    assert_relative_eq!(batch.trials[0].final_balance, 1000.0, max_relative = 1e-12);
    assert_relative_eq!(batch.trials[1].final_balance, 640.0, max_relative = 1e-12);
}

#[test]
fn test_every_trial_is_well_formed() {
    let cfg = config(Strategy::FullStake, 200, 30);
    let sim = Simulation::new(cfg.clone()).unwrap();
    let batch = sim.run_seeded().unwrap();

    assert_eq!(batch.config, cfg);
    for trial in &batch.trials {
        assert_eq!(trial.trajectory().len(), 31);
        assert_eq!(trial.path.outcomes().len(), 30);
        assert_eq!(trial.wins + trial.losses, 30);
        assert_eq!(trial.trajectory()[0], 1000.0);
        assert_eq!(trial.final_balance, trial.path.final_balance());
        assert!(trial.final_balance > 0.0);
        assert_relative_eq!(
            trial.final_balance,
            cfg.rules
                .closed_form_final(1000.0, trial.wins, trial.losses, 1.0),
            max_relative = 1e-9
        );
    }
}

#[test]
fn test_seeded_runs_are_bit_identical() {
    let sim = Simulation::new(config(Strategy::PartialStake, 50, 30)).unwrap();
    let a = sim.run_seeded().unwrap();
    let b = sim.run_seeded().unwrap();
    assert_eq!(a, b);

    let mut src = CoinFlips::new(StdRng::seed_from_u64(42), 0.5).unwrap();
    let c = sim.run(&mut src);
    assert_eq!(a, c);
}

#[test]
fn test_different_seeds_diverge() {
    let a = Simulation::new(config(Strategy::FullStake, 20, 30).with_seed(1))
        .unwrap()
        .run_seeded()
        .unwrap();
    let b = Simulation::new(config(Strategy::FullStake, 20, 30).with_seed(2))
        .unwrap()
        .run_seeded()
        .unwrap();
    assert_ne!(a.final_balances(), b.final_balances());
}

#[test]
fn test_strategies_do_not_share_a_stream() {
    // Running one strategy first must not change what the other produces.
    let partial = Simulation::new(config(Strategy::PartialStake, 25, 10)).unwrap();
    let alone = partial.run_seeded().unwrap();

    let full = Simulation::new(config(Strategy::FullStake, 25, 10)).unwrap();
    let _ = full.run_seeded().unwrap();
    let after = partial.run_seeded().unwrap();

    assert_eq!(alone, after);
}

#[test]
fn test_progress_callback_sees_every_trial() {
    let sim = Simulation::new(config(Strategy::FullStake, 12, 5)).unwrap();
    let mut seen = Vec::new();
    let mut src = sim.seeded_source().unwrap();
    let batch = sim.run_with_progress(&mut src, |t| seen.push(t.index));
    assert_eq!(seen, (1..=12).collect::<Vec<_>>());
    assert_eq!(batch.len(), 12);
}

#[test]
fn test_certain_win_probability() {
    let mut cfg = config(Strategy::FullStake, 5, 4);
    cfg.rules.win_probability = 1.0;
    let batch = Simulation::new(cfg).unwrap().run_seeded().unwrap();
    for t in &batch.trials {
        assert_eq!(t.wins, 4);
        assert_relative_eq!(t.final_balance, 1000.0 * 1.5_f64.powi(4), max_relative = 1e-12);
    }
}

#[test]
fn test_invalid_config_fails_before_running() {
    let err = Simulation::new(config(Strategy::FullStake, 0, 30)).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig { field: "trials", .. }));

    let err = Simulation::new(config(Strategy::FullStake, 10, 0)).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig { field: "horizon", .. }));
}

#[test]
fn test_ages_follow_start_age() {
    let sim = Simulation::new(config(Strategy::FullStake, 1, 3)).unwrap();
    let batch = sim.run_seeded().unwrap();
    assert_eq!(batch.trials[0].ages(25), vec![25, 26, 27, 28]);
}
