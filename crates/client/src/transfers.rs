//! Transfer-history endpoint — token transfers for one address.

use serde::Deserialize;
use tallyline_recon::TransferRecord;
use url::Url;

use crate::common::{truncate_body, ApiClient};
use crate::error::ClientError;

/// The endpoint's envelope. Errors are reported in-band: `result` is an
/// array on success and a bare message string otherwise.
#[derive(Debug, Deserialize)]
struct TransferResponse {
    #[serde(default)]
    message: String,
    result: serde_json::Value,
}

/// Fetch the full token transfer history for `address`, oldest first.
pub fn fetch_token_transfers(
    client: &ApiClient,
    base_url: &str,
    contract: &str,
    address: &str,
    api_key: &str,
) -> Result<Vec<TransferRecord>, ClientError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ClientError::Malformed(format!("invalid transfer endpoint: {e}")))?;
    url.query_pairs_mut()
        .append_pair("module", "account")
        .append_pair("action", "tokentx")
        .append_pair("contractaddress", contract)
        .append_pair("address", address)
        .append_pair("sort", "asc")
        .append_pair("apikey", api_key);

    let response = client
        .http()
        .get(url.as_str())
        .send()
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        let body = response.text().unwrap_or_default();
        return Err(ClientError::Status { status, message: truncate_body(&body) });
    }

    let body: TransferResponse = response
        .json()
        .map_err(|e| ClientError::Malformed(e.to_string()))?;

    match body.result {
        serde_json::Value::Array(_) => serde_json::from_value(body.result)
            .map_err(|e| ClientError::Malformed(e.to_string())),
        other => Err(ClientError::Malformed(format!(
            "transfer endpoint said '{}': {}",
            body.message,
            truncate_body(&other.to_string()),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const CONTRACT: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";
    const ADDRESS: &str = "0x3c5142f28567e6a0f172fd0baaf1f2847f49d02f";

    #[test]
    fn builds_query_and_parses_records() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api")
                .query_param("module", "account")
                .query_param("action", "tokentx")
                .query_param("contractaddress", CONTRACT)
                .query_param("address", ADDRESS)
                .query_param("sort", "asc")
                .query_param("apikey", "k");
            then.status(200).json_body(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": [
                    { "to": "0xc37e6d18ee56440b186257968a295eb54036821a",
                      "value": "5000000000000000000",
                      "timeStamp": "1672531200",
                      "from": ADDRESS,
                      "blockNumber": "16308190" }
                ]
            }));
        });

        let client = ApiClient::new().unwrap();
        let records =
            fetch_token_transfers(&client, &server.url("/api"), CONTRACT, ADDRESS, "k").unwrap();

        mock.assert();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, "5000000000000000000");
        assert_eq!(records[0].time_stamp, "1672531200");
    }

    #[test]
    fn in_band_error_string_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200).json_body(serde_json::json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Max rate limit reached"
            }));
        });

        let client = ApiClient::new().unwrap();
        let err = fetch_token_transfers(&client, &server.url("/api"), CONTRACT, ADDRESS, "k")
            .unwrap_err();

        match err {
            ClientError::Malformed(msg) => {
                assert!(msg.contains("NOTOK"));
                assert!(msg.contains("Max rate limit reached"));
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn empty_result_array_is_no_transfers() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200).json_body(serde_json::json!({
                "status": "0",
                "message": "No transactions found",
                "result": []
            }));
        });

        let client = ApiClient::new().unwrap();
        let records =
            fetch_token_transfers(&client, &server.url("/api"), CONTRACT, ADDRESS, "k").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn upstream_failure_is_a_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(503).body("unavailable");
        });

        let client = ApiClient::new().unwrap();
        let err = fetch_token_transfers(&client, &server.url("/api"), CONTRACT, ADDRESS, "k")
            .unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 503, .. }));
    }
}
