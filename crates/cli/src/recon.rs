//! `tally recon` — the full reconciliation pipeline.

use std::path::PathBuf;

use clap::Subcommand;

use tallyline_client::{resolve_api_key, transfers, ApiClient};
use tallyline_recon::model::TransferRecord;
use tallyline_recon::ReconReport;

use crate::exit_codes::{EXIT_RECON_MISMATCH, EXIT_RECON_RUNTIME};
use crate::fetch::{load_config, render_transfer_report, TRANSFERS_KEY_ENV};
use crate::snapshot::latest_snapshot_dir;
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile a test export against a reference export
    #[command(after_help = "\
Exit code 3 indicates reportable discrepancies. A transfer fetch failure
is logged and the run continues without ledger cross-checking; series
errors are fatal.

Examples:
  tally recon run --test exports/20240101/monthly.json \\
      --compared queries/monthly.test.json
  tally recon run --snapshots exports --file monthly.json \\
      --compared queries/monthly.test.json
  TRANSFERS_API_KEY=… tally recon run --test … --compared … \\
      --transfers-url https://api.example.org/api
  tally recon run --test … --compared … --transfers transfers.json \\
      --json --output report.json --csv months.csv")]
    Run {
        /// Recon config file
        #[arg(long, default_value = "tally.toml")]
        config: PathBuf,

        /// Test series export (JSON file)
        #[arg(long, conflicts_with = "snapshots")]
        test: Option<PathBuf>,

        /// Snapshot root; the latest dated folder supplies the test file
        #[arg(long, requires = "file")]
        snapshots: Option<PathBuf>,

        /// Test file path relative to the chosen snapshot folder
        #[arg(long)]
        file: Option<String>,

        /// Reference series export to compare against
        #[arg(long)]
        compared: PathBuf,

        /// Fetch live transfers from this endpoint
        #[arg(long, conflicts_with = "transfers")]
        transfers_url: Option<String>,

        /// Read transfer records from a local JSON file instead
        #[arg(long)]
        transfers: Option<PathBuf>,

        /// Output the full report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write months-with-differences as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  tally recon validate --config tally.toml")]
    Validate {
        /// Recon config file
        #[arg(long, default_value = "tally.toml")]
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run {
            config,
            test,
            snapshots,
            file,
            compared,
            transfers_url,
            transfers,
            json,
            output,
            csv,
            quiet,
        } => cmd_recon_run(RunArgs {
            config,
            test,
            snapshots,
            file,
            compared,
            transfers_url,
            transfers,
            json,
            output,
            csv,
            quiet,
        }),
        ReconCommands::Validate { config } => cmd_recon_validate(config),
    }
}

struct RunArgs {
    config: PathBuf,
    test: Option<PathBuf>,
    snapshots: Option<PathBuf>,
    file: Option<String>,
    compared: PathBuf,
    transfers_url: Option<String>,
    transfers: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
    quiet: bool,
}

fn runtime_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_RECON_RUNTIME, message: msg.into(), hint: None }
}

fn cmd_recon_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;

    // Resolve the test export: an explicit path, or the latest snapshot.
    let test_path = match (args.test, args.snapshots) {
        (Some(path), _) => path,
        (None, Some(base)) => {
            let folder = latest_snapshot_dir(&base)?;
            if !args.quiet {
                eprintln!("Selecting test file from {}", folder.display());
            }
            folder.join(args.file.as_deref().unwrap_or_default())
        }
        (None, None) => {
            return Err(CliError::args("either --test or --snapshots is required")
                .with_hint("tally recon run --test export.json --compared reference.json"));
        }
    };

    let test = load_series_file(&test_path)?;
    let compared = load_series_file(&args.compared)?;

    // The independent ledger. A live fetch failure degrades to an empty
    // ledger with a warning; a missing credential or unreadable local
    // file does not.
    let records: Vec<TransferRecord> = if let Some(ref path) = args.transfers {
        let text = std::fs::read_to_string(path)
            .map_err(|e| runtime_err(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| runtime_err(format!("invalid transfer records in {}: {e}", path.display())))?
    } else if let Some(ref url) = args.transfers_url {
        let api_key = resolve_api_key(TRANSFERS_KEY_ENV).map_err(CliError::fetch)?;
        let client = ApiClient::new().map_err(CliError::fetch)?;
        match transfers::fetch_token_transfers(
            &client,
            url,
            &config.transfers.token_contract,
            &config.transfers.source_address,
            &api_key,
        ) {
            Ok(records) => records,
            Err(e) => {
                eprintln!("warning: transfer fetch failed, continuing without ledger: {e}");
                Vec::new()
            }
        }
    } else {
        if !args.quiet {
            eprintln!("note: no transfer source given, skipping ledger cross-check");
        }
        Vec::new()
    };

    let report = tallyline_recon::run(&config, &test, &compared, &records)
        .map_err(|e| runtime_err(e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| runtime_err(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| runtime_err(format!("cannot write output: {e}")))?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if let Some(ref path) = args.csv {
        write_differences_csv(path, &report)?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        println!("{json_str}");
    } else {
        print!(
            "{}",
            render_recon_report(
                &report,
                config.comparison.tolerance,
                &config.transfers.source_address,
            )
        );
    }

    if !report.comparison.months_with_differences.is_empty() {
        return Err(CliError {
            code: EXIT_RECON_MISMATCH,
            message: "differences found".into(),
            hint: None,
        });
    }

    Ok(())
}

fn load_series_file(
    path: &PathBuf,
) -> Result<Vec<tallyline_recon::model::PeriodEntry>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| runtime_err(format!("cannot read {}: {e}", path.display())))?;
    tallyline_recon::load_series(&text)
        .map_err(|e| runtime_err(format!("{}: {e}", path.display())))
}

fn write_differences_csv(path: &PathBuf, report: &ReconReport) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| runtime_err(format!("cannot write {}: {e}", path.display())))?;
    for month in &report.comparison.months_with_differences {
        writer
            .serialize(month)
            .map_err(|e| runtime_err(format!("CSV serialization error: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| runtime_err(format!("cannot write {}: {e}", path.display())))
}

/// The human report: comparison summary, transfer breakdown, and the
/// per-month residual lines. Values are rounded for display only.
fn render_recon_report(report: &ReconReport, tolerance: f64, address: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let comparison = &report.comparison;

    let _ = writeln!(out, "Accuracy: {}%", comparison.accuracy.round());
    let _ = writeln!(out, "Total difference: {}", comparison.total_difference.round());
    let _ = writeln!(out, "Months with significant differences (>={tolerance}):");
    for month in &comparison.months_with_differences {
        let _ = writeln!(
            out,
            "{}: Difference: {}, Test: {}, Compared: {}",
            month.month.slashed(),
            month.difference.round(),
            month.test_value.round(),
            month.compared_value.round(),
        );
    }

    if !report.transfers.by_month.is_empty() {
        let _ = writeln!(out);
        out.push_str(&render_transfer_report(address, &report.transfers));

        let _ = writeln!(out);
        let _ = writeln!(out, "Comparison of differences:");
        for delta in &report.deltas {
            let _ = writeln!(
                out,
                "{}: {} - {} = {}",
                delta.period.slashed(),
                delta.file_difference.round(),
                delta.observed_total.round(),
                delta.residual.round(),
            );
        }
    }

    out
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: recon '{}' — tolerance {}, floor {}, {} allow-listed address(es), {} exclusion code(s), {} account(s)",
        config.name,
        config.comparison.tolerance,
        config.comparison.start_floor,
        config.transfers.allow_list.len(),
        config.exclusions.codes.len(),
        config.accounts.len(),
    );
    Ok(())
}
