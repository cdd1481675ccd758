use std::collections::{BTreeMap, BTreeSet};

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Column taxonomy for the interactive explorer
// ---------------------------------------------------------------------------

/// Columns with a 1–99 style rating scale.
pub const RATING_COLUMNS: &[&str] = &["overall", "potential"];

pub const AGE_COLUMN: &str = "age";

/// Key in-game attributes, each a numeric range control.
pub const ATTRIBUTE_COLUMNS: &[&str] = &[
    "pace",
    "shooting",
    "passing",
    "dribbling",
    "defending",
    "physic",
    "attacking_crossing",
    "movement_reactions",
    "power_shot_power",
];

/// Small integer domains (1–5 stars), shown as stepped range controls.
pub const ORDINAL_COLUMNS: &[&str] = &["weak_foot", "skill_moves"];

/// Multi-select columns over observed unique values.
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "player_positions",
    "club_name",
    "nationality_name",
    "preferred_foot",
];

/// A player can hold several position tokens in one string field
/// (`"ST, CF"`), so selection membership on this column is substring
/// containment rather than equality.
pub const POSITIONS_COLUMN: &str = "player_positions";

/// The only FilterState entries reapplied on top of precomputed named
/// views; everything else drives the "ALL" view exclusively.
pub const RESERVED_RANGE_COLUMNS: &[&str] = &["overall", "age"];

// ---------------------------------------------------------------------------
// FilterState – the user's current choices per column
// ---------------------------------------------------------------------------

/// Current value of one interactive control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    /// Inclusive numeric range.
    Range(f64, f64),
    /// Selected categorical values; empty means "no restriction".
    Selection(BTreeSet<String>),
}

/// Per-column filter choices for one session. Entries are created lazily on
/// first access with defaults derived from the base dataset, survive across
/// reruns, and are never cleared by switching views. Owned by the session's
/// `AppState` and passed by reference; there is no global store.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    entries: BTreeMap<String, ControlValue>,
}

impl FilterState {
    pub fn get(&self, column: &str) -> Option<&ControlValue> {
        self.entries.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: ControlValue) {
        self.entries.insert(column.into(), value);
    }

    /// Current range for a column, lazily defaulting to the base dataset's
    /// observed `(min, max)`. Once stored, the value sticks regardless of
    /// later dataset changes.
    pub fn range_or_default(&mut self, column: &str, base: &Dataset) -> (f64, f64) {
        let entry = self.entries.entry(column.to_string()).or_insert_with(|| {
            let (min, max) = base.numeric_bounds(column).unwrap_or((0.0, 0.0));
            ControlValue::Range(min, max)
        });
        // A selection stored under a range column is stale taxonomy;
        // reset it to the full bound, same as `selection_mut` does for
        // the opposite mismatch.
        if let ControlValue::Selection(_) = entry {
            let (min, max) = base.numeric_bounds(column).unwrap_or((0.0, 0.0));
            *entry = ControlValue::Range(min, max);
        }
        match entry {
            ControlValue::Range(lo, hi) => (*lo, *hi),
            ControlValue::Selection(_) => unreachable!(),
        }
    }

    pub fn set_range(&mut self, column: &str, lo: f64, hi: f64) {
        self.entries
            .insert(column.to_string(), ControlValue::Range(lo, hi));
    }

    /// Mutable access to a column's selection set, created empty on first
    /// access (empty selection restricts nothing).
    pub fn selection_mut(&mut self, column: &str) -> &mut BTreeSet<String> {
        let entry = self
            .entries
            .entry(column.to_string())
            .or_insert_with(|| ControlValue::Selection(BTreeSet::new()));
        if let ControlValue::Selection(set) = entry {
            set
        } else {
            *entry = ControlValue::Selection(BTreeSet::new());
            match entry {
                ControlValue::Selection(set) => set,
                ControlValue::Range(..) => unreachable!(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Control derivation
// ---------------------------------------------------------------------------

/// Specification of one interactive control, derived from base dataset
/// statistics. Bounds and options always come from the *base* dataset, so
/// they never shrink while other filters are active.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlSpec {
    Range {
        column: String,
        min: f64,
        max: f64,
    },
    /// Range over a small integer domain, stepped by whole values.
    SteppedRange {
        column: String,
        min: i64,
        max: i64,
    },
    MultiSelect {
        column: String,
        options: Vec<String>,
        /// Membership by substring containment (multi-valued position field).
        substring: bool,
    },
}

impl ControlSpec {
    pub fn column(&self) -> &str {
        match self {
            ControlSpec::Range { column, .. }
            | ControlSpec::SteppedRange { column, .. }
            | ControlSpec::MultiSelect { column, .. } => column,
        }
    }
}

/// One sidebar section of controls.
#[derive(Debug, Clone)]
pub struct ControlGroup {
    pub title: &'static str,
    pub controls: Vec<ControlSpec>,
}

fn range_spec(base: &Dataset, column: &str) -> Option<ControlSpec> {
    base.numeric_bounds(column).map(|(min, max)| ControlSpec::Range {
        column: column.to_string(),
        min,
        max,
    })
}

fn stepped_spec(base: &Dataset, column: &str) -> Option<ControlSpec> {
    base.numeric_bounds(column)
        .map(|(min, max)| ControlSpec::SteppedRange {
            column: column.to_string(),
            min: min.floor() as i64,
            max: max.ceil() as i64,
        })
}

fn multiselect_spec(base: &Dataset, column: &str) -> Option<ControlSpec> {
    if !base.has_column(column) {
        return None;
    }
    let options = base.unique_strings(column);
    if options.is_empty() {
        return None;
    }
    Some(ControlSpec::MultiSelect {
        column: column.to_string(),
        options,
        substring: column == POSITIONS_COLUMN,
    })
}

/// Derive the sidebar control groups from the base dataset. Columns absent
/// from the dataset simply get no control.
pub fn control_groups(base: &Dataset) -> Vec<ControlGroup> {
    let ratings_and_age = RATING_COLUMNS
        .iter()
        .chain(std::iter::once(&AGE_COLUMN))
        .filter_map(|col| range_spec(base, col))
        .collect();

    let attributes = ATTRIBUTE_COLUMNS
        .iter()
        .filter_map(|col| range_spec(base, col))
        .collect();

    let categorical_and_technical = ORDINAL_COLUMNS
        .iter()
        .filter_map(|col| stepped_spec(base, col))
        .chain(
            CATEGORICAL_COLUMNS
                .iter()
                .filter_map(|col| multiselect_spec(base, col)),
        )
        .collect();

    vec![
        ControlGroup {
            title: "Ratings & Age",
            controls: ratings_and_age,
        },
        ControlGroup {
            title: "Key Attributes",
            controls: attributes,
        },
        ControlGroup {
            title: "Categorical & Technical",
            controls: categorical_and_technical,
        },
    ]
}

// ---------------------------------------------------------------------------
// Composite predicate
// ---------------------------------------------------------------------------

fn record_passes(
    dataset: &Dataset,
    idx: usize,
    spec: &ControlSpec,
    value: &ControlValue,
) -> bool {
    let rec = &dataset.records[idx];
    match (spec, value) {
        (ControlSpec::Range { column, .. }, ControlValue::Range(lo, hi))
        | (ControlSpec::SteppedRange { column, .. }, ControlValue::Range(lo, hi)) => rec
            .number(column)
            .is_some_and(|v| v >= *lo && v <= *hi),
        (
            ControlSpec::MultiSelect {
                column, substring, ..
            },
            ControlValue::Selection(selected),
        ) => {
            if selected.is_empty() {
                return true;
            }
            if *substring {
                let raw = rec.text(column).unwrap_or("");
                selected.iter().any(|opt| raw.contains(opt.as_str()))
            } else {
                rec.text(column)
                    .is_some_and(|v| selected.contains(v))
            }
        }
        // Mismatched spec/state shapes restrict nothing.
        _ => true,
    }
}

/// Apply every control derived from the base dataset, lazily initializing
/// missing state entries, and return the indices of records passing all of
/// them (logical AND).
pub fn apply_controls(base: &Dataset, state: &mut FilterState) -> Vec<usize> {
    let mut active: Vec<(ControlSpec, ControlValue)> = Vec::new();

    for group in control_groups(base) {
        for spec in group.controls {
            let value = match &spec {
                ControlSpec::Range { column, .. } | ControlSpec::SteppedRange { column, .. } => {
                    let (lo, hi) = state.range_or_default(column, base);
                    ControlValue::Range(lo, hi)
                }
                ControlSpec::MultiSelect { column, .. } => {
                    ControlValue::Selection(state.selection_mut(column).clone())
                }
            };
            active.push((spec, value));
        }
    }

    (0..base.len())
        .filter(|&idx| {
            active
                .iter()
                .all(|(spec, value)| record_passes(base, idx, spec, value))
        })
        .collect()
}

/// Apply only the reserved `overall`/`age` ranges to a precomputed named
/// view. Entries are read, never created: a range the user has not touched
/// yet (and thus never initialized) restricts nothing here.
pub fn apply_reserved_ranges(view: &Dataset, state: &FilterState) -> Vec<usize> {
    let ranges: Vec<(&str, f64, f64)> = RESERVED_RANGE_COLUMNS
        .iter()
        .filter(|col| view.has_column(col))
        .filter_map(|col| match state.get(col) {
            Some(ControlValue::Range(lo, hi)) => Some((*col, *lo, *hi)),
            _ => None,
        })
        .collect();

    (0..view.len())
        .filter(|&idx| {
            ranges.iter().all(|(col, lo, hi)| {
                view.records[idx]
                    .number(col)
                    .is_some_and(|v| v >= *lo && v <= *hi)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, CoercionPolicy, Record};

    fn player(fields: &[(&str, CellValue)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn squad() -> Dataset {
        let records = vec![
            player(&[
                ("short_name", CellValue::String("striker".into())),
                ("overall", CellValue::Integer(88)),
                ("age", CellValue::Integer(29)),
                ("pace", CellValue::Integer(85)),
                ("player_positions", CellValue::String("ST, CF".into())),
                ("club_name", CellValue::String("Arsenal".into())),
                ("preferred_foot", CellValue::String("Right".into())),
            ]),
            player(&[
                ("short_name", CellValue::String("defender".into())),
                ("overall", CellValue::Integer(82)),
                ("age", CellValue::Integer(24)),
                ("pace", CellValue::Integer(70)),
                ("player_positions", CellValue::String("CB".into())),
                ("club_name", CellValue::String("Milan".into())),
                ("preferred_foot", CellValue::String("Left".into())),
            ]),
            player(&[
                ("short_name", CellValue::String("kid".into())),
                ("overall", CellValue::Integer(65)),
                ("age", CellValue::Integer(17)),
                ("pace", CellValue::Integer(90)),
                ("player_positions", CellValue::String("RW".into())),
                ("club_name", CellValue::String("Arsenal".into())),
                ("preferred_foot", CellValue::String("Right".into())),
            ]),
        ];
        Dataset::from_records(records, &CoercionPolicy::default())
    }

    #[test]
    fn default_bounds_match_base_dataset_extremes() {
        let base = squad();
        let mut state = FilterState::default();
        assert_eq!(state.range_or_default("overall", &base), (65.0, 88.0));
        assert_eq!(state.range_or_default("age", &base), (17.0, 29.0));
    }

    #[test]
    fn mismatched_entry_kinds_are_reset_on_access() {
        let base = squad();
        let mut state = FilterState::default();

        // A selection left under a numeric column is replaced by the
        // full range, and the repaired entry sticks.
        state.set("overall", ControlValue::Selection(BTreeSet::new()));
        assert_eq!(state.range_or_default("overall", &base), (65.0, 88.0));
        assert_eq!(
            state.get("overall"),
            Some(&ControlValue::Range(65.0, 88.0))
        );

        // Same policy in the other direction: a range under a
        // categorical column becomes an empty selection.
        state.set("preferred_foot", ControlValue::Range(0.0, 1.0));
        assert!(state.selection_mut("preferred_foot").is_empty());
        assert_eq!(
            state.get("preferred_foot"),
            Some(&ControlValue::Selection(BTreeSet::new()))
        );
    }

    #[test]
    fn defaults_leave_everything_visible() {
        let base = squad();
        let mut state = FilterState::default();
        assert_eq!(apply_controls(&base, &mut state).len(), base.len());
    }

    #[test]
    fn narrowing_then_widening_back_restores_the_full_count() {
        let base = squad();
        let mut state = FilterState::default();
        let full = apply_controls(&base, &mut state).len();

        let (lo, hi) = state.range_or_default("overall", &base);
        state.set_range("overall", 80.0, hi);
        assert_eq!(apply_controls(&base, &mut state).len(), 2);

        state.set_range("overall", lo, hi);
        assert_eq!(apply_controls(&base, &mut state).len(), full);
    }

    #[test]
    fn position_selection_uses_substring_containment() {
        let base = squad();
        let mut state = FilterState::default();

        state
            .selection_mut(POSITIONS_COLUMN)
            .insert("ST".to_string());
        let visible = apply_controls(&base, &mut state);
        assert_eq!(visible, vec![0]);

        state.selection_mut(POSITIONS_COLUMN).clear();
        state
            .selection_mut(POSITIONS_COLUMN)
            .insert("CF".to_string());
        assert_eq!(apply_controls(&base, &mut state), vec![0]);

        state.selection_mut(POSITIONS_COLUMN).clear();
        state
            .selection_mut(POSITIONS_COLUMN)
            .insert("CB".to_string());
        assert_eq!(apply_controls(&base, &mut state), vec![1]);
    }

    #[test]
    fn empty_selection_restricts_nothing_but_a_choice_does() {
        let base = squad();
        let mut state = FilterState::default();
        assert_eq!(apply_controls(&base, &mut state).len(), 3);

        state.selection_mut("club_name").insert("Arsenal".to_string());
        assert_eq!(apply_controls(&base, &mut state), vec![0, 2]);
    }

    #[test]
    fn controls_and_ranges_combine_with_logical_and() {
        let base = squad();
        let mut state = FilterState::default();
        state.selection_mut("club_name").insert("Arsenal".to_string());
        state.set_range("age", 16.0, 20.0);
        assert_eq!(apply_controls(&base, &mut state), vec![2]);
    }

    #[test]
    fn absent_columns_get_no_control() {
        let base = Dataset::from_records(
            vec![player(&[("overall", CellValue::Integer(80))])],
            &CoercionPolicy::default(),
        );
        let groups = control_groups(&base);
        let all: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.controls.iter().map(|c| c.column()))
            .collect();
        assert_eq!(all, vec!["overall"]);
    }

    #[test]
    fn lazy_default_sticks_after_first_access() {
        let base = squad();
        let mut state = FilterState::default();
        let first = state.range_or_default("overall", &base);

        // A different dataset no longer influences the stored entry.
        let other = Dataset::from_records(
            vec![player(&[("overall", CellValue::Integer(99))])],
            &CoercionPolicy::default(),
        );
        assert_eq!(state.range_or_default("overall", &other), first);
    }

    #[test]
    fn reserved_ranges_apply_to_named_views_only_when_set() {
        let view = squad();
        let mut state = FilterState::default();

        // Untouched state: nothing restricts the view.
        assert_eq!(apply_reserved_ranges(&view, &state).len(), 3);

        state.set_range("overall", 80.0, 99.0);
        state.selection_mut("club_name").insert("Milan".to_string());
        let visible = apply_reserved_ranges(&view, &state);
        // Club selection is not reserved, so it does not affect the view.
        assert_eq!(visible, vec![0, 1]);
    }
}
