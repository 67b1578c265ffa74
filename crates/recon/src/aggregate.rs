use std::collections::{BTreeMap, HashSet};

use crate::config::{ExclusionConfig, TransferConfig};
use crate::error::ReconError;
use crate::model::{PeriodEntry, SeriesRow, TransferRecord, TransferTotals};
use crate::period::Period;

/// Sum transfers per month, and per month + counterparty, restricted to
/// allow-listed destinations.
///
/// Addresses compare case-insensitively (both sides lowercased); the
/// timestamp month is taken in UTC. Amounts are integer token units scaled
/// by 10^decimals and summed in f64; precision loss on very large sums is
/// accepted. No filtering on sign or magnitude.
pub fn aggregate_transfers(
    records: &[TransferRecord],
    config: &TransferConfig,
) -> Result<TransferTotals, ReconError> {
    let allowed: HashSet<String> = config
        .allow_list
        .iter()
        .map(|a| a.to_ascii_lowercase())
        .collect();
    let scale = config.scale();

    let mut totals = TransferTotals::default();

    for record in records {
        let counterparty = record.to.to_ascii_lowercase();
        if !allowed.contains(&counterparty) {
            continue;
        }

        let secs: i64 = record.time_stamp.parse().map_err(|_| ReconError::RecordParse {
            field: "timeStamp",
            value: record.time_stamp.clone(),
        })?;
        let period = Period::from_timestamp_utc(secs).ok_or_else(|| {
            ReconError::RecordParse {
                field: "timeStamp",
                value: record.time_stamp.clone(),
            }
        })?;
        let units: u128 = record.value.parse().map_err(|_| ReconError::RecordParse {
            field: "value",
            value: record.value.clone(),
        })?;
        let amount = units as f64 / scale;

        *totals.by_month.entry(period).or_insert(0.0) += amount;
        *totals
            .by_counterparty
            .entry(period)
            .or_default()
            .entry(counterparty)
            .or_insert(0.0) += amount;
    }

    Ok(totals)
}

/// Collapse a series to one summed row per month, dropping rows tagged
/// with an excluded classification code.
///
/// A row participates only when it has a numeric value and a non-empty
/// first dimension path; containment is substring, not equality, so a code
/// matches anywhere in the path. Months between the first and last
/// contributing period are padded with a zero row, and the result is in
/// ascending period order.
pub fn collapse_series_excluding(
    series: &[PeriodEntry],
    exclusions: &ExclusionConfig,
) -> Vec<PeriodEntry> {
    let mut sums: BTreeMap<Period, f64> = BTreeMap::new();

    for entry in series {
        for row in &entry.rows {
            let Some(value) = row.value else { continue };
            let Some(path) = row.dimensions.first().map(|d| d.path.as_str()) else {
                continue;
            };
            if path.is_empty() {
                continue;
            }
            if exclusions.codes.iter().any(|code| path.contains(code.as_str())) {
                continue;
            }
            *sums.entry(entry.period).or_insert(0.0) += value;
        }
    }

    let (Some(&first), Some(&last)) = (sums.keys().next(), sums.keys().next_back()) else {
        return Vec::new();
    };

    first
        .through(last)
        .map(|period| PeriodEntry {
            period,
            rows: vec![SeriesRow {
                value: Some(sums.get(&period).copied().unwrap_or(0.0)),
                dimensions: Vec::new(),
            }],
        })
        .collect()
}
