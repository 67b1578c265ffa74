//! `tally fetch` — pull upstream data into local export files.

use std::path::PathBuf;

use clap::Subcommand;

use tallyline_client::{analytics, resolve_api_key, transfers, ApiClient};
use tallyline_recon::aggregate::{aggregate_transfers, collapse_series_excluding};
use tallyline_recon::model::AnalyticsResponse;
use tallyline_recon::prune::prune_zero_dimensions;
use tallyline_recon::ReconConfig;

use crate::exit_codes::EXIT_RECON_INVALID_CONFIG;
use crate::CliError;

/// Env var for the analytics endpoint credential. Optional: the endpoint
/// accepts unauthenticated queries at a lower rate limit.
const ANALYTICS_KEY_ENV: &str = "ANALYTICS_API_KEY";

/// Env var for the transfer-history endpoint credential. Required.
pub const TRANSFERS_KEY_ENV: &str = "TRANSFERS_API_KEY";

#[derive(Subcommand)]
pub enum FetchCommands {
    /// Run a GraphQL series query and save the pruned response
    #[command(after_help = "\
The raw response is pruned (zero/null rows dropped, emptied branches
collapsed) before writing. With --filtered, the series is instead parsed,
collapsed to one summed row per month with the configured exclusion codes
applied, and re-wrapped in the standard envelope.

Examples:
  tally fetch series --url https://api.example.org/graphql \\
      --query queries/monthly.gql --variables queries/monthly.vars.json \\
      --out exports/20240101/monthly.json
  tally fetch series --url … --query … --variables … \\
      --out exports/20240101/monthly-filtered.json \\
      --filtered --config tally.toml
  ANALYTICS_API_KEY=… tally fetch series …")]
    Series {
        /// Analytics endpoint URL
        #[arg(long)]
        url: String,

        /// Path to the GraphQL query file
        #[arg(long)]
        query: PathBuf,

        /// Path to the JSON variables file
        #[arg(long)]
        variables: PathBuf,

        /// Output JSON file
        #[arg(long)]
        out: PathBuf,

        /// Collapse to one summed row per month, applying exclusion codes
        #[arg(long)]
        filtered: bool,

        /// Recon config supplying the exclusion codes (with --filtered)
        #[arg(long, default_value = "tally.toml")]
        config: PathBuf,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Fetch token transfers and print monthly counterparty sums
    #[command(after_help = "\
Examples:
  TRANSFERS_API_KEY=… tally fetch transfers \\
      --url https://api.example.org/api --config tally.toml
  tally fetch transfers --url … --address 0x… --out transfers.json
  tally fetch transfers --url … --json")]
    Transfers {
        /// Transfer-history endpoint URL
        #[arg(long)]
        url: String,

        /// Source address to query (default: transfers.source_address)
        #[arg(long)]
        address: Option<String>,

        /// Recon config
        #[arg(long, default_value = "tally.toml")]
        config: PathBuf,

        /// Write the raw records to this JSON file
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output aggregated totals as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },
}

pub fn cmd_fetch(cmd: FetchCommands) -> Result<(), CliError> {
    match cmd {
        FetchCommands::Series { url, query, variables, out, filtered, config, quiet } => {
            cmd_fetch_series(url, query, variables, out, filtered, config, quiet)
        }
        FetchCommands::Transfers { url, address, config, out, json, quiet } => {
            cmd_fetch_transfers(url, address, config, out, json, quiet)
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| CliError {
        code: EXIT_RECON_INVALID_CONFIG,
        message: e.to_string(),
        hint: None,
    })
}

fn cmd_fetch_series(
    url: String,
    query_path: PathBuf,
    variables_path: PathBuf,
    out: PathBuf,
    filtered: bool,
    config_path: PathBuf,
    quiet: bool,
) -> Result<(), CliError> {
    let query = std::fs::read_to_string(&query_path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", query_path.display())))?;
    let variables_text = std::fs::read_to_string(&variables_path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", variables_path.display())))?;
    let variables: serde_json::Value = serde_json::from_str(&variables_text)
        .map_err(|e| CliError::io(format!("invalid variables file: {e}")))?;

    let api_key = resolve_api_key(ANALYTICS_KEY_ENV).ok();

    if !quiet {
        eprintln!("Fetching {url}...");
    }

    let client = ApiClient::new().map_err(CliError::fetch)?;
    let raw = analytics::fetch_series(&client, &url, &query, &variables, api_key.as_deref())
        .map_err(CliError::fetch)?;

    let output = if filtered {
        let config = load_config(&config_path)?;
        let series = AnalyticsResponse::from_value(raw)
            .map_err(|e| CliError {
                code: crate::exit_codes::EXIT_FETCH_MALFORMED,
                message: e.to_string(),
                hint: None,
            })?
            .into_series();
        let collapsed = collapse_series_excluding(&series, &config.exclusions);
        serde_json::to_value(AnalyticsResponse::wrap(collapsed))
            .map_err(|e| CliError::io(e.to_string()))?
    } else {
        prune_zero_dimensions(raw).unwrap_or(serde_json::Value::Null)
    };

    let pretty = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    std::fs::write(&out, pretty.as_bytes())
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", out.display())))?;

    if !quiet {
        eprintln!("Results saved to {}", out.display());
    }

    Ok(())
}

fn cmd_fetch_transfers(
    url: String,
    address: Option<String>,
    config_path: PathBuf,
    out: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let address = address.unwrap_or_else(|| config.transfers.source_address.clone());
    let api_key = resolve_api_key(TRANSFERS_KEY_ENV).map_err(CliError::fetch)?;

    if !quiet {
        eprintln!("Fetching transfers for {address}...");
    }

    let client = ApiClient::new().map_err(CliError::fetch)?;
    let records = transfers::fetch_token_transfers(
        &client,
        &url,
        &config.transfers.token_contract,
        &address,
        &api_key,
    )
    .map_err(CliError::fetch)?;

    if let Some(ref out_path) = out {
        let raw = serde_json::to_string_pretty(&records)
            .map_err(|e| CliError::io(e.to_string()))?;
        std::fs::write(out_path, raw.as_bytes())
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", out_path.display())))?;
        if !quiet {
            eprintln!("Raw records saved to {}", out_path.display());
        }
    }

    let totals = aggregate_transfers(&records, &config.transfers).map_err(|e| CliError {
        code: crate::exit_codes::EXIT_FETCH_MALFORMED,
        message: e.to_string(),
        hint: None,
    })?;

    if json {
        let out = serde_json::to_string_pretty(&totals)
            .map_err(|e| CliError::io(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    print!("{}", render_transfer_report(&address, &totals));
    Ok(())
}

/// The monthly counterparty breakdown, one month per block.
pub fn render_transfer_report(
    address: &str,
    totals: &tallyline_recon::model::TransferTotals,
) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Monthly transfer sums for {address}");
    for (period, counterparties) in &totals.by_counterparty {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}:", period.slashed());
        let _ = writeln!(out, "  Total: {:.2}", totals.by_month[period]);
        for (counterparty, sum) in counterparties {
            let _ = writeln!(out, "  {counterparty}: {sum:.2}");
        }
    }
    out
}
