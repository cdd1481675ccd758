use std::path::PathBuf;

use anyhow::{Context, Result};

use scoutbench::config;
use scoutbench::data::loader;
use scoutbench::data::model::CoercionPolicy;
use scoutbench::engine::generate;

/// Batch generator: evaluate every filter definition in the config against
/// the player dataset and write one JSON ready list per entry.
///
/// Usage: `generate_views [players.csv] [filters.json] [output_dir]`
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let csv_path = PathBuf::from(args.next().unwrap_or_else(|| "data/players.csv".to_string()));
    let config_path =
        PathBuf::from(args.next().unwrap_or_else(|| "data/filters.json".to_string()));
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "output/json".to_string()));

    // No compact-integer zero-fill here: the persisted views must keep
    // missing cells as explicit nulls.
    let dataset = loader::load_dataset(&csv_path, &CoercionPolicy::preserving_nulls())
        .with_context(|| format!("loading dataset {}", csv_path.display()))?;
    let config = config::load_config(&config_path)?;

    let generated = generate::generate_views(&dataset, &config, &output_dir)?;

    println!(
        "{generated} of {} views generated into {}",
        config.filters.len(),
        output_dir.display()
    );
    Ok(())
}
