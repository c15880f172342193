use crate::config::SimulationConfig;
use crate::runner::SimulationBatch;
use crate::stats::BatchStatistics;
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Save one row per trial: final balance and win/lose counts.
pub fn save_final_balances_csv(
    batch: &SimulationBatch,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["trial", "final_balance", "wins", "losses"])?;

    for t in &batch.trials {
        wtr.write_record(&[
            t.index.to_string(),
            format!("{:.6}", t.final_balance),
            t.wins.to_string(),
            t.losses.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save every trajectory in long format, one row per (trial, period).
/// Period 0 has no stake or outcome.
pub fn save_trajectories_csv(
    batch: &SimulationBatch,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["trial", "period", "age", "balance", "stake", "outcome"])?;

    let start_age = batch.config.start_age;
    for t in &batch.trials {
        for (period, balance) in t.path.balances().iter().enumerate() {
            let (stake, outcome) = match period.checked_sub(1) {
                Some(i) => (
                    format!("{:.6}", t.path.stakes()[i]),
                    t.path.outcomes()[i].name().to_string(),
                ),
                None => (String::new(), String::new()),
            };
            wtr.write_record(&[
                t.index.to_string(),
                period.to_string(),
                (start_age + period as u32).to_string(),
                format!("{:.6}", balance),
                stake,
                outcome,
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Save summary statistics to pretty-printed JSON.
pub fn save_summary_json(
    stats: &BatchStatistics,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Save the run configuration in the same TOML shape `SimulationConfig::load` reads.
pub fn save_config_toml(
    config: &SimulationConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_parent(path)?;
    let toml = toml::to_string_pretty(config)?;
    std::fs::write(path, toml)?;
    Ok(())
}

/// Save all outputs for a batch to a directory.
pub fn save_all(
    batch: &SimulationBatch,
    stats: &BatchStatistics,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output_dir)?;

    save_final_balances_csv(batch, &output_dir.join("final_balances.csv"))?;
    save_trajectories_csv(batch, &output_dir.join("trajectories.csv"))?;
    save_summary_json(stats, &output_dir.join("summary.json"))?;
    save_config_toml(&batch.config, &output_dir.join("config.toml"))?;

    Ok(())
}
