use crate::aggregate::aggregate_transfers;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::compare_series;
use crate::model::{
    AnalyticsResponse, PeriodDelta, PeriodEntry, ReconMeta, ReconReport, TransferRecord,
};

/// Run a full reconciliation over fully materialized inputs.
///
/// `transfers` is the independent ledger; pass an empty slice when the
/// fetch failed upstream and the run should still produce the comparison.
pub fn run(
    config: &ReconConfig,
    test: &[PeriodEntry],
    compared: &[PeriodEntry],
    transfers: &[TransferRecord],
) -> Result<ReconReport, ReconError> {
    let comparison = compare_series(
        test,
        compared,
        config.comparison.start_floor,
        config.comparison.tolerance,
    );

    let totals = aggregate_transfers(transfers, &config.transfers)?;

    // For every month the ledger observed, subtract its total from the
    // file-level discrepancy. A month absent from the discrepancy list
    // contributes zero, not an error.
    let deltas: Vec<PeriodDelta> = totals
        .by_month
        .iter()
        .map(|(&period, &observed_total)| {
            let file_difference = comparison.difference_for(period);
            PeriodDelta {
                period,
                file_difference,
                observed_total,
                residual: file_difference - observed_total,
            }
        })
        .collect();

    Ok(ReconReport {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        comparison,
        transfers: totals,
        deltas,
    })
}

/// Parse a stored series export. The full envelope must be present; a
/// payload without `data.analytics.series` is malformed, not empty.
pub fn load_series(json: &str) -> Result<Vec<PeriodEntry>, ReconError> {
    let response: AnalyticsResponse =
        serde_json::from_str(json).map_err(|e| ReconError::MalformedInput(e.to_string()))?;
    Ok(response.into_series())
}
