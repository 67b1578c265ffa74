//! `tallyline-client` — HTTP collaborators for the reconciliation engine.
//!
//! Thin, sequential fetchers. Each function issues one request and either
//! returns parsed data or a terminal error; there is no retry policy and
//! no caching. Credentials are resolved from the environment by the
//! caller, never read from config files.

pub mod accounts;
pub mod analytics;
mod common;
mod error;
pub mod transfers;

pub use common::{resolve_api_key, ApiClient};
pub use error::ClientError;
