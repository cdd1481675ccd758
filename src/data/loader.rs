use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, CoercionPolicy, Dataset, Record};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DataError {
    #[error("dataset file not found: {0}")]
    Missing(PathBuf),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row names columns, one player per row
/// * `.json` – array of flat objects (the persisted named-view format)
pub fn load_dataset(path: &Path, policy: &CoercionPolicy) -> Result<Dataset, DataError> {
    if !path.exists() {
        return Err(DataError::Missing(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, policy),
        "json" => load_json(path, policy),
        other => Err(DataError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Numeric columns may arrive as text; per-cell guessing handles the common
/// case and the [`CoercionPolicy`] inside `Dataset::from_records` settles
/// column-level types once.
fn load_csv(path: &Path, policy: &CoercionPolicy) -> Result<Dataset, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| parse_err(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_err(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.map_err(|e| DataError::Parse {
            path: path.to_path_buf(),
            message: format!("row {row_no}: {e}"),
        })?;

        let mut rec = Record::default();
        for (idx, header) in headers.iter().enumerate() {
            let raw = row.get(idx).unwrap_or("");
            rec.insert(header.clone(), guess_cell(raw));
        }
        records.push(rec);
    }

    Ok(Dataset::from_records(records, policy))
}

fn guess_cell(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader (persisted named views)
// ---------------------------------------------------------------------------

fn load_json(path: &Path, policy: &CoercionPolicy) -> Result<Dataset, DataError> {
    let text = std::fs::read_to_string(path).map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| parse_err(path, e))?;

    let rows = root.as_array().ok_or_else(|| DataError::Parse {
        path: path.to_path_buf(),
        message: "expected top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or_else(|| DataError::Parse {
            path: path.to_path_buf(),
            message: format!("row {i} is not a JSON object"),
        })?;

        let mut rec = Record::default();
        for (col, val) in obj {
            rec.insert(col.clone(), json_to_cell(val));
        }
        records.push(rec);
    }

    Ok(Dataset::from_records(records, policy))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::String(b.to_string()),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

fn parse_err(path: &Path, e: impl std::fmt::Display) -> DataError {
    DataError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Dataset cache
// ---------------------------------------------------------------------------

/// Memoizes loaded datasets by path + modification time, so the reactive
/// rerun of the UI does not reparse files every frame. Cached datasets are
/// shared read-only; a touched file reloads on next access.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, (Option<SystemTime>, Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn load(
        &mut self,
        path: &Path,
        policy: &CoercionPolicy,
    ) -> Result<Arc<Dataset>, DataError> {
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();

        if let Some((cached_mtime, dataset)) = self.entries.get(path) {
            if modified.is_some() && *cached_mtime == modified {
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(load_dataset(path, policy)?);
        self.entries
            .insert(path.to_path_buf(), (modified, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Degraded load for named views: an unreadable file is an empty
    /// dataset, not an abort.
    pub fn load_or_empty(&mut self, path: &Path, policy: &CoercionPolicy) -> Arc<Dataset> {
        match self.load(path, policy) {
            Ok(dataset) => dataset,
            Err(e) => {
                log::warn!("treating {} as empty: {e}", path.display());
                Arc::new(Dataset::empty())
            }
        }
    }
}
