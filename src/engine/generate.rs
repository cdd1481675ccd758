use std::path::Path;

use anyhow::{Context, Result};

use crate::config::FiltersConfig;
use crate::data::model::Dataset;
use crate::engine::{expr, pipeline};

/// Run every filter definition against the dataset and persist one JSON
/// view per entry under `output_dir`. A definition whose condition cannot
/// be interpreted is logged and skipped; the rest still generate. Returns
/// the number of views written.
pub fn generate_views(
    dataset: &Dataset,
    config: &FiltersConfig,
    output_dir: &Path,
) -> Result<usize> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut generated = 0;

    for def in &config.filters {
        let matches = match expr::evaluate(dataset, &def.cond) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("skipping filter '{}': {e}", def.name());
                continue;
            }
        };

        // The view is fully sorted and sanitized before anything touches
        // disk.
        let view = pipeline::build_view(matches, def, &config.bargain);
        let text = serde_json::to_string(&view.to_json()).context("serializing view")?;

        let path = output_dir.join(&def.file);
        std::fs::write(&path, text)
            .with_context(|| format!("writing view {}", path.display()))?;

        log::info!("wrote {} ({} records)", path.display(), view.records.len());
        generated += 1;
    }

    Ok(generated)
}
