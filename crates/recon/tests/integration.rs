use std::path::PathBuf;

use tallyline_recon::aggregate::{aggregate_transfers, collapse_series_excluding};
use tallyline_recon::engine::{load_series, run};
use tallyline_recon::model::{AnalyticsResponse, TransferRecord};
use tallyline_recon::prune::prune_zero_dimensions;
use tallyline_recon::{Period, ReconConfig};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_fixtures() -> (ReconConfig, Vec<tallyline_recon::model::PeriodEntry>, Vec<tallyline_recon::model::PeriodEntry>, Vec<TransferRecord>) {
    let config = ReconConfig::from_toml(&read_fixture("tally.toml")).unwrap();
    let test = load_series(&read_fixture("monthly-current.json")).unwrap();
    let compared = load_series(&read_fixture("monthly-reference.json")).unwrap();
    let transfers: Vec<TransferRecord> =
        serde_json::from_str(&read_fixture("transfers.json")).unwrap();
    (config, test, compared, transfers)
}

// -------------------------------------------------------------------------
// Full pipeline
// -------------------------------------------------------------------------

#[test]
fn full_run_over_fixture_exports() {
    let (config, test, compared, transfers) = load_fixtures();
    let report = run(&config, &test, &compared, &transfers).unwrap();

    // Aligned at or after the floor: 2023-01 (exact match), 2023-02
    // (difference 2.0), 2023-03 (difference 0.25, below tolerance).
    // 2022-12 is floored out, 2023-04 has no reference entry.
    assert_eq!(report.comparison.accuracy, (1.0f64 / 3.0) * 100.0);
    assert_eq!(report.comparison.total_difference, 2.25);
    assert_eq!(report.comparison.months_with_differences.len(), 1);

    let month = &report.comparison.months_with_differences[0];
    assert_eq!(month.month, Period::new(2023, 2).unwrap());
    assert_eq!(month.difference, 2.0);
    assert_eq!(month.test_value, 50.0);
    assert_eq!(month.compared_value, 48.0);

    // Transfers: 5.0 + 2.5 in January, 1.0 in February; the record to the
    // non-allow-listed destination is ignored.
    let january = Period::new(2023, 1).unwrap();
    let february = Period::new(2023, 2).unwrap();
    assert_eq!(report.transfers.by_month[&january], 7.5);
    assert_eq!(report.transfers.by_month[&february], 1.0);
    assert_eq!(report.transfers.by_counterparty[&january].len(), 2);

    // Residuals: January had no recorded discrepancy, February had 2.0.
    assert_eq!(report.deltas.len(), 2);
    assert_eq!(report.deltas[0].period, january);
    assert_eq!(report.deltas[0].file_difference, 0.0);
    assert_eq!(report.deltas[0].residual, -7.5);
    assert_eq!(report.deltas[1].period, february);
    assert_eq!(report.deltas[1].residual, 2.0 - 1.0);
}

#[test]
fn identical_series_reconcile_clean() {
    let (config, test, _, _) = load_fixtures();
    let report = run(&config, &test, &test, &[]).unwrap();

    assert_eq!(report.comparison.accuracy, 100.0);
    assert_eq!(report.comparison.total_difference, 0.0);
    assert!(report.comparison.months_with_differences.is_empty());
    assert!(report.deltas.is_empty());
}

// -------------------------------------------------------------------------
// Prune → store → load round trip
// -------------------------------------------------------------------------

#[test]
fn pruned_payload_feeds_the_comparison_unchanged() {
    let raw: serde_json::Value = serde_json::json!({
        "data": { "analytics": { "series": [
            { "period": "2023-01", "rows": [
                { "value": 100.0 },
                { "value": 0 },
                { "value": null }
            ] },
            { "period": "2023-02", "rows": [ { "value": 50.0 } ] }
        ] } }
    });

    let pruned = prune_zero_dimensions(raw).unwrap();
    let stored = serde_json::to_string_pretty(&pruned).unwrap();
    let series = load_series(&stored).unwrap();

    // Zero and null rows are gone; the sums the matcher sees are intact.
    assert_eq!(series[0].rows.len(), 1);
    assert_eq!(series[0].rows[0].value, Some(100.0));
    assert_eq!(series[1].rows[0].value, Some(50.0));
}

// -------------------------------------------------------------------------
// Filtered export variant
// -------------------------------------------------------------------------

#[test]
fn filtered_export_wraps_back_into_the_envelope() {
    let (config, test, _, _) = load_fixtures();

    let collapsed = collapse_series_excluding(&test, &config.exclusions);
    let envelope = AnalyticsResponse::wrap(collapsed);
    let stored = serde_json::to_string(&envelope).unwrap();
    let reloaded = load_series(&stored).unwrap();

    // 2023-01 keeps only the GOV-001 row (SF-001 is excluded). The other
    // months carry untagged rows only, which never participate, so the
    // collapsed export is a single month.
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].period, Period::new(2023, 1).unwrap());
    assert_eq!(reloaded[0].rows[0].value, Some(60.0));
}

// -------------------------------------------------------------------------
// Aggregation details
// -------------------------------------------------------------------------

#[test]
fn counterparty_casing_merges_across_records() {
    let (config, _, _, transfers) = load_fixtures();
    let totals = aggregate_transfers(&transfers, &config.transfers).unwrap();

    let january = Period::new(2023, 1).unwrap();
    // The uppercase and lowercase spellings of the same counterparty are
    // one bucket.
    assert!(totals.by_counterparty[&january]
        .keys()
        .all(|a| a == &a.to_ascii_lowercase()));
}

#[test]
fn config_fixture_is_valid() {
    let config = ReconConfig::from_toml(&read_fixture("tally.toml")).unwrap();
    assert_eq!(config.transfers.allow_list.len(), 3);
    assert_eq!(config.accounts.len(), 2);
    assert_eq!(config.exclusions.codes.len(), 3);
}
