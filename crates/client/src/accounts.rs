//! Address directory endpoint — the remote list of known counterparties.

use serde::Deserialize;

use crate::common::{truncate_body, ApiClient};
use crate::error::ClientError;

/// One row of the remote address directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub address: String,
    #[serde(default)]
    pub cu_id: String,
}

/// Fetch the remote address directory as a flat list.
pub fn fetch_address_directory(
    client: &ApiClient,
    url: &str,
) -> Result<Vec<DirectoryEntry>, ClientError> {
    let response = client
        .http()
        .get(url)
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

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn parses_directory_rows() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/expenses/adr-list");
            then.status(200).json_body(serde_json::json!([
                { "address": "0xc37e6d18ee56440b186257968a295eb54036821a", "cu_id": "GOV-001" },
                { "address": "0x2bc5ffc5de1a83a9e4cddfa138baed516d70414b" }
            ]));
        });

        let client = ApiClient::new().unwrap();
        let entries =
            fetch_address_directory(&client, &server.url("/expenses/adr-list")).unwrap();

        mock.assert();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].cu_id, "GOV-001");
        assert_eq!(entries[1].cu_id, "");
    }

    #[test]
    fn object_body_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/expenses/adr-list");
            then.status(200).json_body(serde_json::json!({ "error": "nope" }));
        });

        let client = ApiClient::new().unwrap();
        let err =
            fetch_address_directory(&client, &server.url("/expenses/adr-list")).unwrap_err();
        assert!(matches!(err, ClientError::Malformed(_)));
    }
}
