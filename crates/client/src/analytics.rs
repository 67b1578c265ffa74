//! Analytics endpoint — GraphQL queries over monthly series.

use serde_json::Value;

use crate::common::{truncate_body, ApiClient};
use crate::error::ClientError;

/// POST a GraphQL query and return the raw response tree.
///
/// The raw tree is returned untyped so the caller can prune it before
/// persisting; typed parsing happens at the storage boundary. Errors on
/// this path propagate — a run without its primary series has nothing to
/// compare.
pub fn fetch_series(
    client: &ApiClient,
    url: &str,
    query: &str,
    variables: &Value,
    api_key: Option<&str>,
) -> Result<Value, ClientError> {
    let payload = serde_json::json!({ "query": query, "variables": variables });

    let mut request = client.http().post(url).json(&payload);
    if let Some(key) = api_key {
        request = request.header("x-api-key", key);
    }

    let response = request
        .send()
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        let body = response.text().unwrap_or_default();
        return Err(ClientError::Status { status, message: truncate_body(&body) });
    }

    response
        .json()
        .map_err(|e| ClientError::Malformed(e.to_string()))
}
