//! Structural pruning of raw API payloads.
//!
//! Snapshots keep only rows that carry a value; zero/null rows and the
//! branches they empty out are dropped before anything is written to disk.
//! The comparison path never runs over this function directly, so the
//! output keeps the exact envelope shape the series loader expects.

use serde_json::{Map, Value};

/// Prune a JSON tree: drop zero/absent-value rows, collapse subtrees that
/// end up empty, pass scalars through unchanged.
///
/// Pure and consuming; returns `None` when the whole tree prunes away.
/// Inputs are API JSON and therefore acyclic; recursion is bounded by the
/// tree's natural depth. Idempotent: pruning a pruned tree is a no-op.
pub fn prune_zero_dimensions(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(prune_zero_dimensions).collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Array(kept))
            }
        }
        Value::Object(entries) => {
            let mut pruned = Map::new();
            for (key, child) in entries {
                let child = if key == "rows" { retain_valued_rows(child) } else { child };
                if let Some(kept) = prune_zero_dimensions(child) {
                    pruned.insert(key, kept);
                }
            }
            if pruned.is_empty() {
                None
            } else {
                Some(Value::Object(pruned))
            }
        }
        scalar => Some(scalar),
    }
}

/// Drop rows whose `value` is 0, null, or missing. Non-object rows carry
/// no value at all and are dropped with them.
fn retain_valued_rows(rows: Value) -> Value {
    match rows {
        Value::Array(items) => {
            Value::Array(items.into_iter().filter(row_has_value).collect())
        }
        other => other,
    }
}

fn row_has_value(row: &Value) -> bool {
    match row.get("value") {
        None | Some(Value::Null) => false,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_zero_null_and_missing_values() {
        let input = json!({
            "rows": [
                { "value": 0 },
                { "value": null },
                { "dimensions": [{ "path": "atlas/x" }] },
                { "value": -5 },
                { "value": 0.01 },
            ]
        });
        let pruned = prune_zero_dimensions(input).unwrap();
        let rows = pruned["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["value"], json!(-5));
        assert_eq!(rows[1]["value"], json!(0.01));
    }

    #[test]
    fn collapses_emptied_containers() {
        let input = json!({
            "data": {
                "analytics": {
                    "series": [
                        { "period": "2023-01", "rows": [ { "value": 0 } ] }
                    ]
                }
            }
        });
        // The rows array empties, the entry keeps its period, the envelope
        // survives.
        let pruned = prune_zero_dimensions(input).unwrap();
        let series = pruned["data"]["analytics"]["series"].as_array().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0], json!({ "period": "2023-01" }));
    }

    #[test]
    fn whole_tree_can_prune_away() {
        assert_eq!(prune_zero_dimensions(json!({ "a": { "b": null } })), None);
        assert_eq!(prune_zero_dimensions(json!([])), None);
        assert_eq!(prune_zero_dimensions(json!(null)), None);
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(prune_zero_dimensions(json!(0)), Some(json!(0)));
        assert_eq!(prune_zero_dimensions(json!("x")), Some(json!("x")));
        assert_eq!(prune_zero_dimensions(json!(false)), Some(json!(false)));
    }

    #[test]
    fn idempotent() {
        let input = json!({
            "data": {
                "analytics": {
                    "series": [
                        { "period": "2023-01", "rows": [
                            { "value": 100.0, "dimensions": [{ "path": "atlas/a" }] },
                            { "value": 0 },
                        ] },
                        { "period": "2023-02", "rows": [ { "value": null } ] }
                    ]
                }
            },
            "empty": {}
        });
        let once = prune_zero_dimensions(input).unwrap();
        let twice = prune_zero_dimensions(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn pruned_snapshot_still_loads_as_series() {
        let input = json!({
            "data": { "analytics": { "series": [
                { "period": "2023-01", "rows": [ { "value": 100.0 }, { "value": 0 } ] },
                { "period": "2023-02", "rows": [ { "value": 0 } ] }
            ] } }
        });
        let pruned = prune_zero_dimensions(input).unwrap();
        let series = crate::engine::load_series(&pruned.to_string()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].rows.len(), 1);
        assert!(series[1].rows.is_empty());
    }

    #[test]
    fn rows_key_with_non_array_value_is_left_alone() {
        let input = json!({ "rows": "not-an-array" });
        let pruned = prune_zero_dimensions(input).unwrap();
        assert_eq!(pruned["rows"], json!("not-an-array"));
    }
}
