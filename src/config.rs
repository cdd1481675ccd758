use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Filter configuration (filters.json)
// ---------------------------------------------------------------------------

/// Top-level filter configuration document:
///
/// ```json
/// {
///   "filters": [
///     { "file": "top_overall.json", "cond": "overall >= 85", "sort": "overall", "limit": 50 }
///   ],
///   "bargain": { "max_value_eur": 15000000, "min_overall": 82 }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    pub filters: Vec<FilterDefinition>,
    #[serde(default)]
    pub bargain: BargainConfig,
}

/// One declarative filter: expression, sort key, optional row cap.
/// Loaded once and immutable afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterDefinition {
    /// Output file name, e.g. `"young_talents.json"`.
    pub file: String,
    /// Boolean expression over column comparisons, e.g.
    /// `"overall >= 80 and age <= 23"`.
    pub cond: String,
    /// Column to sort descending by.
    pub sort: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FilterDefinition {
    /// View name: the output file name without its `.json` extension.
    pub fn name(&self) -> &str {
        self.file.strip_suffix(".json").unwrap_or(&self.file)
    }

    /// Structural augmentation applied after expression evaluation.
    /// Bargain handling keys off the output file name, as the original
    /// curation rules do.
    pub fn special_case(&self) -> Option<SpecialCase> {
        if self.file.contains("bargain") {
            Some(SpecialCase::Bargain)
        } else {
            None
        }
    }
}

/// Tags for per-filter structural augmentation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCase {
    /// Value-for-money lists: cheap but highly rated players.
    Bargain,
}

/// Thresholds for the bargain special case.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BargainConfig {
    pub max_value_eur: f64,
    pub min_overall: f64,
}

impl Default for BargainConfig {
    fn default() -> Self {
        BargainConfig {
            max_value_eur: 15_000_000.0,
            min_overall: 82.0,
        }
    }
}

/// Load and parse the filter configuration document.
pub fn load_config(path: &Path) -> Result<FiltersConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading filter config {}", path.display()))?;
    let config: FiltersConfig =
        serde_json::from_str(&text).context("parsing filter config JSON")?;
    Ok(config)
}
