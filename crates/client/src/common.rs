use std::time::Duration;

use crate::error::ClientError;

pub(crate) const USER_AGENT: &str = concat!("tally/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared blocking HTTP client.
///
/// Requests are issued one at a time and awaited before the next step
/// begins. A failure is terminal for the operation that issued it: the
/// only timeout is the transport default configured here, and nothing is
/// retried.
pub struct ApiClient {
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http })
    }

    pub(crate) fn http(&self) -> &reqwest::blocking::Client {
        &self.http
    }
}

/// Resolve a credential from the environment. Empty values are treated
/// as absent.
pub fn resolve_api_key(var: &str) -> Result<String, ClientError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ClientError::MissingKey(var.to_string())),
    }
}

/// First part of a response body, for error messages. Upstream error pages
/// can be arbitrarily large; 200 chars is enough to see what went wrong.
pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(200).collect()
}
