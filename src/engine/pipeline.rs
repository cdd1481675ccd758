use serde_json::{Map, Value as JsonValue};

use crate::config::{BargainConfig, FilterDefinition, SpecialCase};
use crate::data::model::{CellValue, Record};

// ---------------------------------------------------------------------------
// NamedView – the persisted form of one filter definition's output
// ---------------------------------------------------------------------------

/// A cleaned, sorted, limited record sequence ready to persist. Regenerated
/// in full on every generator run, immutable otherwise.
#[derive(Debug, Clone)]
pub struct NamedView {
    pub name: String,
    pub records: Vec<Record>,
}

impl NamedView {
    /// JSON form: an array of flat objects, with explicit `null` for every
    /// missing value. Records are already sanitized when the view is built,
    /// so NaN can no longer appear here.
    pub fn to_json(&self) -> JsonValue {
        let rows: Vec<JsonValue> = self
            .records
            .iter()
            .map(|rec| {
                let mut obj = Map::new();
                for (col, val) in &rec.fields {
                    obj.insert(col.clone(), cell_to_json(val));
                }
                JsonValue::Object(obj)
            })
            .collect();
        JsonValue::Array(rows)
    }
}

fn cell_to_json(value: &CellValue) -> JsonValue {
    match value {
        CellValue::Null => JsonValue::Null,
        CellValue::Integer(i) => JsonValue::from(*i),
        CellValue::Float(v) => serde_json::Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        CellValue::String(s) => JsonValue::String(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Build the named view for one filter definition from the evaluator's
/// matches: special-case augmentation, descending sort, limit, sanitize.
pub fn build_view(
    matches: Vec<Record>,
    def: &FilterDefinition,
    bargain: &BargainConfig,
) -> NamedView {
    let mut records = matches;

    if def.special_case() == Some(SpecialCase::Bargain) {
        records.retain(|rec| is_bargain(rec, bargain));
    }

    sort_descending(&mut records, &def.sort);

    if let Some(limit) = def.limit {
        records.truncate(limit);
    }

    for rec in &mut records {
        sanitize_record(rec);
    }

    NamedView {
        name: def.name().to_string(),
        records,
    }
}

/// Cheap but good: capped market value, non-zero (zero means unvalued, not
/// free), and a minimum overall rating.
fn is_bargain(rec: &Record, config: &BargainConfig) -> bool {
    let value = rec.number("value_eur");
    let overall = rec.number("overall");
    matches!((value, overall), (Some(v), Some(o))
        if v <= config.max_value_eur && v > 0.0 && o >= config.min_overall)
}

/// Stable descending sort by a numeric sort key. Records missing the key
/// (or holding a non-numeric value there) sort below everything else;
/// ties keep their relative source order.
pub fn sort_descending(records: &mut [Record], sort_key: &str) {
    records.sort_by(|a, b| {
        let ka = a.number(sort_key).unwrap_or(f64::NEG_INFINITY);
        let kb = b.number(sort_key).unwrap_or(f64::NEG_INFINITY);
        kb.total_cmp(&ka)
    });
}

/// Replace NaN floats with an explicit null in every field. Idempotent:
/// a sanitized record passes through unchanged.
pub fn sanitize_record(rec: &mut Record) {
    for value in rec.fields.values_mut() {
        if let CellValue::Float(v) = value {
            if v.is_nan() {
                *value = CellValue::Null;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, fields: &[(&str, CellValue)]) -> Record {
        let mut rec: Record = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        rec.insert("short_name", CellValue::String(name.to_string()));
        rec
    }

    fn names(view: &NamedView) -> Vec<&str> {
        view.records
            .iter()
            .filter_map(|r| r.text("short_name"))
            .collect()
    }

    fn definition(file: &str, sort: &str, limit: Option<usize>) -> FilterDefinition {
        FilterDefinition {
            file: file.to_string(),
            cond: String::new(),
            sort: sort.to_string(),
            limit,
        }
    }

    #[test]
    fn sorts_descending_with_stable_ties_and_missing_last() {
        let matches = vec![
            player("mid", &[("overall", CellValue::Integer(80))]),
            player("tied_first", &[("overall", CellValue::Integer(90))]),
            player("no_key", &[]),
            player("tied_second", &[("overall", CellValue::Integer(90))]),
        ];
        let view = build_view(
            matches,
            &definition("list.json", "overall", None),
            &BargainConfig::default(),
        );
        assert_eq!(names(&view), vec!["tied_first", "tied_second", "mid", "no_key"]);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let matches = vec![
            player("low", &[("overall", CellValue::Integer(70))]),
            player("high", &[("overall", CellValue::Integer(92))]),
            player("mid", &[("overall", CellValue::Integer(81))]),
        ];
        let view = build_view(
            matches,
            &definition("list.json", "overall", Some(2)),
            &BargainConfig::default(),
        );
        assert_eq!(names(&view), vec!["high", "mid"]);
    }

    #[test]
    fn bargain_view_excludes_expensive_free_and_weak_players() {
        let matches = vec![
            player(
                "too_expensive",
                &[
                    ("value_eur", CellValue::Float(20_000_000.0)),
                    ("overall", CellValue::Integer(90)),
                ],
            ),
            player(
                "unvalued",
                &[
                    ("value_eur", CellValue::Float(0.0)),
                    ("overall", CellValue::Integer(88)),
                ],
            ),
            player(
                "too_weak",
                &[
                    ("value_eur", CellValue::Float(5_000_000.0)),
                    ("overall", CellValue::Integer(78)),
                ],
            ),
            player(
                "steal",
                &[
                    ("value_eur", CellValue::Float(12_000_000.0)),
                    ("overall", CellValue::Integer(84)),
                ],
            ),
        ];
        let view = build_view(
            matches,
            &definition("bargain_buys.json", "overall", None),
            &BargainConfig::default(),
        );
        assert_eq!(names(&view), vec!["steal"]);
    }

    #[test]
    fn bargain_thresholds_come_from_config() {
        let matches = vec![player(
            "steal",
            &[
                ("value_eur", CellValue::Float(12_000_000.0)),
                ("overall", CellValue::Integer(84)),
            ],
        )];
        let tight = BargainConfig {
            max_value_eur: 10_000_000.0,
            min_overall: 82.0,
        };
        let view = build_view(
            matches,
            &definition("bargain_buys.json", "overall", None),
            &tight,
        );
        assert!(view.records.is_empty());
    }

    #[test]
    fn sanitize_replaces_nan_everywhere_and_is_idempotent() {
        let mut rec = player(
            "a",
            &[
                ("pace", CellValue::Float(f64::NAN)),
                ("wage_eur", CellValue::Float(f64::NAN)),
                ("overall", CellValue::Integer(80)),
            ],
        );
        sanitize_record(&mut rec);
        assert_eq!(*rec.get("pace"), CellValue::Null);
        assert_eq!(*rec.get("wage_eur"), CellValue::Null);
        assert_eq!(*rec.get("overall"), CellValue::Integer(80));

        let before = rec.clone();
        sanitize_record(&mut rec);
        assert_eq!(rec, before);
    }

    #[test]
    fn json_output_uses_explicit_nulls() {
        let view = build_view(
            vec![player(
                "a",
                &[
                    ("club_name", CellValue::Null),
                    ("pace", CellValue::Float(f64::NAN)),
                ],
            )],
            &definition("list.json", "overall", None),
            &BargainConfig::default(),
        );
        let json = view.to_json();
        let row = &json.as_array().unwrap()[0];
        assert!(row["club_name"].is_null());
        assert!(row["pace"].is_null());
        assert_eq!(row["short_name"], "a");
    }
}
