//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | recon / accounts | Reconciliation-specific codes            |
//! | 50-59   | fetch            | External data source codes               |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Recon / accounts (3-9)
// =============================================================================

/// The comparison found reportable discrepancies.
pub const EXIT_RECON_MISMATCH: u8 = 3;

/// The recon config failed to parse or validate.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 4;

/// Runtime failure while running a recon (unreadable input, bad payload).
pub const EXIT_RECON_RUNTIME: u8 = 5;

/// The remote address directory has entries missing from the local book.
pub const EXIT_ACCOUNTS_DRIFT: u8 = 6;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Missing or rejected credential for an upstream source.
pub const EXIT_FETCH_AUTH: u8 = 50;

/// Upstream transport or HTTP failure.
pub const EXIT_FETCH_UPSTREAM: u8 = 51;

/// Upstream responded with a body we cannot interpret.
pub const EXIT_FETCH_MALFORMED: u8 = 52;
