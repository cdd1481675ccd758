use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a player column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the source CSV dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

/// Shared null so [`Record::get`] can hand out a reference for absent columns.
pub const NULL: CellValue = CellValue::Null;

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "-"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric comparison.
    /// NaN counts as missing, not as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for `Null` and for NaN floats, which the source treats as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row (player) of the source table
// ---------------------------------------------------------------------------

/// One player's full set of column values. Columns absent from a record read
/// as [`CellValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn get(&self, column: &str) -> &CellValue {
        self.fields.get(column).unwrap_or(&NULL)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).as_f64()
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).as_str()
    }

    pub fn is_missing(&self, column: &str) -> bool {
        self.get(column).is_missing()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.fields.insert(column.into(), value);
    }
}

impl FromIterator<(String, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column kinds and coercion policy
// ---------------------------------------------------------------------------

/// Kind of a column, decided once at [`Dataset`] construction and cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    /// Every value in the column is null.
    Empty,
}

/// Column-level coercion rules applied once when a [`Dataset`] is built.
///
/// The source data ships some numeric columns as text (market values, version
/// tags); `numeric_name_tokens` forces those numeric, with unparseable cells
/// becoming null. `compact_integer_max` recasts any numeric column whose
/// observed maximum is below the threshold to plain integers with nulls
/// filled as 0 (ratings and ordinals like `weak_foot`). Both rules are
/// explicit policy, checked once here, never re-inferred per access.
#[derive(Debug, Clone)]
pub struct CoercionPolicy {
    pub numeric_name_tokens: Vec<String>,
    pub compact_integer_max: Option<f64>,
}

impl Default for CoercionPolicy {
    fn default() -> Self {
        CoercionPolicy {
            numeric_name_tokens: vec!["_eur".to_string(), "version".to_string()],
            compact_integer_max: Some(100.0),
        }
    }
}

impl CoercionPolicy {
    /// Policy for persisted output: forced-numeric columns still turn
    /// garbage text into null, but nothing is recast or zero-filled, so a
    /// missing cell stays an explicit null all the way to disk. The
    /// compact-integer recast is a display convenience for the explorer
    /// only.
    pub fn preserving_nulls() -> Self {
        CoercionPolicy {
            compact_integer_max: None,
            ..Self::default()
        }
    }

    fn forces_numeric(&self, column: &str) -> bool {
        self.numeric_name_tokens.iter().any(|t| column.contains(t))
    }
}

fn coerce_numeric(value: &CellValue) -> CellValue {
    match value {
        CellValue::Integer(_) | CellValue::Float(_) | CellValue::Null => value.clone(),
        CellValue::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => CellValue::Float(v),
            Err(_) => CellValue::Null,
        },
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Per-column statistics computed once at construction.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub kind: ColumnKind,
    /// `(min, max)` over non-null numeric values; `None` for text columns.
    pub numeric_bounds: Option<(f64, f64)>,
    /// Sorted unique non-null values; populated for text columns only.
    pub unique_values: BTreeSet<CellValue>,
}

/// The full parsed dataset with pre-computed column statistics.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records (rows), in source order.
    pub records: Vec<Record>,
    /// Ordered list of column names.
    pub column_names: Vec<String>,
    /// Cached per-column kind, bounds, and unique values.
    pub stats: BTreeMap<String, ColumnStats>,
}

impl Dataset {
    /// Build a dataset from rows, applying the coercion policy and computing
    /// column statistics.
    pub fn from_records(mut records: Vec<Record>, policy: &CoercionPolicy) -> Self {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        for rec in &records {
            for col in rec.fields.keys() {
                column_names_set.insert(col.clone());
            }
        }
        let column_names: Vec<String> = column_names_set.into_iter().collect();

        // Pass 1: forced-numeric columns.
        let forced: Vec<String> = column_names
            .iter()
            .filter(|c| policy.forces_numeric(c))
            .cloned()
            .collect();
        for rec in &mut records {
            for col in &forced {
                if let Some(v) = rec.fields.get(col) {
                    let coerced = coerce_numeric(v);
                    rec.fields.insert(col.clone(), coerced);
                }
            }
        }

        // Pass 2: kinds and bounds.
        let mut stats = compute_stats(&records, &column_names);

        // Pass 3: compact-integer recast for small-valued numeric columns.
        if let Some(threshold) = policy.compact_integer_max {
            let compact: Vec<String> = stats
                .iter()
                .filter(|(_, s)| {
                    matches!(s.kind, ColumnKind::Integer | ColumnKind::Float)
                        && s.numeric_bounds.is_some_and(|(_, max)| max < threshold)
                })
                .map(|(c, _)| c.clone())
                .collect();
            if !compact.is_empty() {
                for rec in &mut records {
                    for col in &compact {
                        let recast = match rec.get(col).as_f64() {
                            Some(v) => CellValue::Integer(v.round() as i64),
                            None => CellValue::Integer(0),
                        };
                        rec.fields.insert(col.clone(), recast);
                    }
                }
                stats = compute_stats(&records, &column_names);
            }
        }

        Dataset {
            records,
            column_names,
            stats,
        }
    }

    /// An empty dataset, the degraded form of an unreadable source.
    pub fn empty() -> Self {
        Dataset {
            records: Vec::new(),
            column_names: Vec::new(),
            stats: BTreeMap::new(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.stats.contains_key(column)
    }

    pub fn numeric_bounds(&self, column: &str) -> Option<(f64, f64)> {
        self.stats.get(column).and_then(|s| s.numeric_bounds)
    }

    /// Sorted unique non-null values of a text column, as display strings.
    pub fn unique_strings(&self, column: &str) -> Vec<String> {
        self.stats
            .get(column)
            .map(|s| s.unique_values.iter().map(|v| v.to_string()).collect())
            .unwrap_or_default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn compute_stats(records: &[Record], column_names: &[String]) -> BTreeMap<String, ColumnStats> {
    let mut stats = BTreeMap::new();

    for col in column_names {
        let mut saw_float = false;
        let mut saw_integer = false;
        let mut saw_text = false;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for rec in records {
            match rec.get(col) {
                CellValue::Null => {}
                CellValue::Float(v) if v.is_nan() => {}
                v @ (CellValue::Integer(_) | CellValue::Float(_)) => {
                    if matches!(v, CellValue::Integer(_)) {
                        saw_integer = true;
                    } else {
                        saw_float = true;
                    }
                    let n = v.as_f64().unwrap_or(0.0);
                    min = min.min(n);
                    max = max.max(n);
                }
                CellValue::String(_) => saw_text = true,
            }
        }

        let kind = if saw_text {
            ColumnKind::Text
        } else if saw_float {
            ColumnKind::Float
        } else if saw_integer {
            ColumnKind::Integer
        } else {
            ColumnKind::Empty
        };

        let numeric_bounds = if (saw_float || saw_integer) && !saw_text && min <= max {
            Some((min, max))
        } else {
            None
        };

        let unique_values = if kind == ColumnKind::Text {
            records
                .iter()
                .map(|r| r.get(col))
                .filter(|v| !v.is_missing())
                .cloned()
                .collect()
        } else {
            BTreeSet::new()
        };

        stats.insert(
            col.clone(),
            ColumnStats {
                kind,
                numeric_bounds,
                unique_values,
            },
        );
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, CellValue)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn forced_numeric_columns_coerce_text_and_null_garbage() {
        let records = vec![
            record(&[("value_eur", CellValue::String("1500000".into()))]),
            record(&[("value_eur", CellValue::String("n/a".into()))]),
        ];
        let ds = Dataset::from_records(records, &CoercionPolicy::default());
        assert_eq!(ds.records[0].number("value_eur"), Some(1_500_000.0));
        assert!(ds.records[1].is_missing("value_eur"));
    }

    #[test]
    fn small_numeric_columns_recast_to_integers_with_zero_fill() {
        let records = vec![
            record(&[("skill_moves", CellValue::Float(3.0))]),
            record(&[("skill_moves", CellValue::Null)]),
        ];
        let ds = Dataset::from_records(records, &CoercionPolicy::default());
        assert_eq!(*ds.records[0].get("skill_moves"), CellValue::Integer(3));
        assert_eq!(*ds.records[1].get("skill_moves"), CellValue::Integer(0));
        assert_eq!(ds.stats["skill_moves"].kind, ColumnKind::Integer);
    }

    #[test]
    fn large_numeric_columns_keep_nulls_and_bounds() {
        let records = vec![
            record(&[("wage_eur", CellValue::Float(230_000.0))]),
            record(&[("wage_eur", CellValue::Null)]),
            record(&[("wage_eur", CellValue::Float(500.0))]),
        ];
        let ds = Dataset::from_records(records, &CoercionPolicy::default());
        assert!(ds.records[1].is_missing("wage_eur"));
        assert_eq!(ds.numeric_bounds("wage_eur"), Some((500.0, 230_000.0)));
    }

    #[test]
    fn text_columns_collect_sorted_unique_values() {
        let records = vec![
            record(&[("club_name", CellValue::String("Real Madrid".into()))]),
            record(&[("club_name", CellValue::String("Arsenal".into()))]),
            record(&[("club_name", CellValue::String("Arsenal".into()))]),
            record(&[("club_name", CellValue::Null)]),
        ];
        let ds = Dataset::from_records(records, &CoercionPolicy::default());
        assert_eq!(
            ds.unique_strings("club_name"),
            vec!["Arsenal", "Real Madrid"]
        );
    }

    #[test]
    fn absent_column_reads_as_null() {
        let rec = record(&[("overall", CellValue::Integer(88))]);
        assert!(rec.is_missing("club_name"));
        assert_eq!(rec.number("overall"), Some(88.0));
    }
}
