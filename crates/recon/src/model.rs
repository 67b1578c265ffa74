use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::period::Period;

// ---------------------------------------------------------------------------
// Input: series exports
// ---------------------------------------------------------------------------

/// One dimension tag on a series row. Only the classification path matters
/// to the engine; anything else in the payload is dropped on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub path: String,
}

/// A single row inside a period entry.
///
/// `value` can be absent in real exports. The aggregation paths skip such
/// rows; the comparison path sums them as NaN, which poisons the period.
/// Loaders feeding the comparison must guarantee numeric rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRow {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,
}

/// One calendar month of rows from a single source. Immutable once loaded.
///
/// `rows` defaults to empty: the pruner collapses emptied row arrays away,
/// and pruned snapshots must still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodEntry {
    pub period: Period,
    #[serde(default)]
    pub rows: Vec<SeriesRow>,
}

/// The analytics endpoint envelope: `data.analytics.series`.
/// Any missing level is malformed input, not an empty series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub data: AnalyticsData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub analytics: Analytics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analytics {
    pub series: Vec<PeriodEntry>,
}

impl AnalyticsResponse {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ReconError> {
        serde_json::from_value(value).map_err(|e| ReconError::MalformedInput(e.to_string()))
    }

    /// Wrap a series back into the standard envelope, for writing exports
    /// that downstream loaders read like any other snapshot.
    pub fn wrap(series: Vec<PeriodEntry>) -> Self {
        Self { data: AnalyticsData { analytics: Analytics { series } } }
    }

    pub fn into_series(self) -> Vec<PeriodEntry> {
        self.data.analytics.series
    }
}

// ---------------------------------------------------------------------------
// Input: transfer ledger
// ---------------------------------------------------------------------------

/// A raw token transfer from the history endpoint, as delivered: every
/// field is a string on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub to: String,
    pub value: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
}

// ---------------------------------------------------------------------------
// Comparison output
// ---------------------------------------------------------------------------

/// One reportable discrepancy between the two series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthDifference {
    pub month: Period,
    /// Signed: test minus compared.
    pub difference: f64,
    pub test_value: f64,
    pub compared_value: f64,
}

/// Outcome of matching two series.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Percentage of aligned periods whose sums were exactly equal.
    pub accuracy: f64,
    /// Signed sum of (test − compared) over all aligned periods.
    pub total_difference: f64,
    /// Discrepancies at or above the tolerance, in test-series order.
    pub months_with_differences: Vec<MonthDifference>,
}

impl ComparisonResult {
    /// Difference recorded for `period`; zero when the period matched,
    /// fell below the tolerance, or never aligned.
    pub fn difference_for(&self, period: Period) -> f64 {
        self.months_with_differences
            .iter()
            .find(|m| m.month == period)
            .map(|m| m.difference)
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Aggregation output
// ---------------------------------------------------------------------------

pub type MonthlySums = BTreeMap<Period, f64>;
pub type CounterpartySums = BTreeMap<Period, BTreeMap<String, f64>>;

/// Monthly transfer totals restricted to allow-listed counterparties.
/// BTreeMap keys keep report iteration in period order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferTotals {
    pub by_month: MonthlySums,
    pub by_counterparty: CounterpartySums,
}

// ---------------------------------------------------------------------------
// Reconciliation output
// ---------------------------------------------------------------------------

/// Residual between the file-level discrepancy and the independently
/// observed transfer total for one month.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodDelta {
    pub period: Period,
    pub file_difference: f64,
    pub observed_total: f64,
    pub residual: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

/// Full output of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub comparison: ComparisonResult,
    pub transfers: TransferTotals,
    pub deltas: Vec<PeriodDelta>,
}
