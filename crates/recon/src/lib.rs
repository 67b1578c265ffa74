//! `tallyline-recon` — monthly series reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded series and transfer records,
//! returns classified results. No CLI or IO dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod period;
pub mod prune;

pub use config::ReconConfig;
pub use engine::{load_series, run};
pub use error::ReconError;
pub use model::{ComparisonResult, ReconReport, TransferRecord};
pub use period::Period;
