//! `tally accounts` — keep the local account book aligned with the
//! remote address directory.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Subcommand;

use tallyline_client::accounts::{fetch_address_directory, DirectoryEntry};
use tallyline_client::ApiClient;

use crate::exit_codes::EXIT_ACCOUNTS_DRIFT;
use crate::fetch::load_config;
use crate::CliError;

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Report directory addresses missing from the local account book
    #[command(after_help = "\
Exit code 6 indicates drift: the directory lists addresses the local
account book does not know about.

Examples:
  tally accounts check --url https://api.example.org/expenses/adr-list
  tally accounts check --url … --config tally.toml --json")]
    Check {
        /// Address directory endpoint URL
        #[arg(long)]
        url: String,

        /// Recon config holding the account book
        #[arg(long, default_value = "tally.toml")]
        config: PathBuf,

        /// Output the missing entries as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_accounts(cmd: AccountsCommands) -> Result<(), CliError> {
    match cmd {
        AccountsCommands::Check { url, config, json } => cmd_accounts_check(url, config, json),
    }
}

fn cmd_accounts_check(url: String, config_path: PathBuf, json: bool) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let known: HashSet<String> = config
        .accounts
        .iter()
        .map(|a| a.address.to_ascii_lowercase())
        .collect();

    let client = ApiClient::new().map_err(CliError::fetch)?;
    let directory = fetch_address_directory(&client, &url).map_err(CliError::fetch)?;

    let missing = missing_entries(&directory, &known);

    if json {
        let rows: Vec<serde_json::Value> = missing
            .iter()
            .map(|entry| {
                serde_json::json!({ "address": entry.address, "cu_id": entry.cu_id })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).map_err(|e| CliError::io(e.to_string()))?
        );
    } else if missing.is_empty() {
        eprintln!("account book covers all {} directory entries", directory.len());
    } else {
        println!("Addresses missing from the account book:");
        for entry in &missing {
            println!("  {} ({})", entry.address, entry.cu_id);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError {
            code: EXIT_ACCOUNTS_DRIFT,
            message: format!("{} address(es) missing from the account book", missing.len()),
            hint: Some(format!("add [[accounts]] entries to {}", config_path.display())),
        })
    }
}

/// Directory entries whose address the local book does not know.
/// Comparison is case-insensitive on the address.
fn missing_entries<'a>(
    directory: &'a [DirectoryEntry],
    known: &HashSet<String>,
) -> Vec<&'a DirectoryEntry> {
    directory
        .iter()
        .filter(|entry| !known.contains(&entry.address.to_ascii_lowercase()))
        .collect()
}
