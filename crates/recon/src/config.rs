use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    pub transfers: TransferConfig,
    #[serde(default)]
    pub exclusions: ExclusionConfig,
    /// The local account book: known counterparties, loaded as data.
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonConfig {
    /// Differences below this magnitude are neither matches nor reportable.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Periods strictly before this date are skipped.
    #[serde(default = "default_start_floor")]
    pub start_floor: NaiveDate,
}

fn default_tolerance() -> f64 {
    1.0
}

fn default_start_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid literal date")
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            start_floor: default_start_floor(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    /// Address whose outgoing transfer history is fetched.
    pub source_address: String,
    /// Token contract the history endpoint is scoped to.
    pub token_contract: String,
    /// Decimal scaling factor: wire amounts are integer token units
    /// of 10^-decimals.
    #[serde(default = "default_decimals")]
    pub token_decimals: u32,
    /// Destination addresses included in the aggregation.
    pub allow_list: Vec<String>,
}

fn default_decimals() -> u32 {
    18
}

impl TransferConfig {
    pub fn scale(&self) -> f64 {
        10f64.powi(self.token_decimals as i32)
    }
}

// ---------------------------------------------------------------------------
// Exclusions + accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExclusionConfig {
    /// Rows whose first dimension path contains any of these codes are
    /// dropped from the filtered export. Substring containment, not
    /// equality.
    #[serde(default)]
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub address: String,
    #[serde(default)]
    pub label: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.comparison.tolerance.is_finite() || self.comparison.tolerance < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance must be finite and non-negative, got {}",
                self.comparison.tolerance
            )));
        }

        if self.transfers.token_decimals > 30 {
            return Err(ReconError::ConfigValidation(format!(
                "token_decimals must be at most 30, got {}",
                self.transfers.token_decimals
            )));
        }

        if self.transfers.allow_list.is_empty() {
            return Err(ReconError::ConfigValidation(
                "allow_list must not be empty".into(),
            ));
        }

        check_address("transfers.source_address", &self.transfers.source_address)?;
        check_address("transfers.token_contract", &self.transfers.token_contract)?;
        for address in &self.transfers.allow_list {
            check_address("transfers.allow_list", address)?;
        }
        for account in &self.accounts {
            check_address("accounts", &account.address)?;
        }

        Ok(())
    }

    /// Allow-list lowered once, for case-insensitive membership tests.
    pub fn allow_list_lowercase(&self) -> Vec<String> {
        self.transfers
            .allow_list
            .iter()
            .map(|a| a.to_ascii_lowercase())
            .collect()
    }
}

fn check_address(field: &str, address: &str) -> Result<(), ReconError> {
    let hex = address.strip_prefix("0x").unwrap_or("");
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ReconError::ConfigValidation(format!(
            "{field}: '{address}' is not a 0x-prefixed 20-byte hex address"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
