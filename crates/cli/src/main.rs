// Tallyline CLI - monthly series reconciliation operations

mod accounts;
mod exit_codes;
mod fetch;
mod recon;
mod snapshot;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{
    EXIT_ERROR, EXIT_FETCH_AUTH, EXIT_FETCH_MALFORMED, EXIT_FETCH_UPSTREAM, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Reconcile monthly financial series against an independent transfer ledger")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch data from upstream sources into local exports
    Fetch {
        #[command(subcommand)]
        command: fetch::FetchCommands,
    },

    /// Run or validate a reconciliation
    Recon {
        #[command(subcommand)]
        command: recon::ReconCommands,
    },

    /// Check the local account book against the remote directory
    Accounts {
        #[command(subcommand)]
        command: accounts::AccountsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch { command } => fetch::cmd_fetch(command),
        Commands::Recon { command } => recon::cmd_recon(command),
        Commands::Accounts { command } => accounts::cmd_accounts(command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Map a client failure onto the fetch exit codes, with an env hint
    /// for missing credentials.
    pub fn fetch(err: tallyline_client::ClientError) -> Self {
        use tallyline_client::ClientError;
        match &err {
            ClientError::MissingKey(var) => Self {
                code: EXIT_FETCH_AUTH,
                message: format!("environment variable {var} not set"),
                hint: Some(format!("export {var}=<value>")),
            },
            ClientError::Transport(_) | ClientError::Status { .. } => Self {
                code: EXIT_FETCH_UPSTREAM,
                message: err.to_string(),
                hint: None,
            },
            ClientError::Malformed(_) => Self {
                code: EXIT_FETCH_MALFORMED,
                message: err.to_string(),
                hint: None,
            },
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
