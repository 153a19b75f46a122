//! Application layer used by the binary.
//!
//! This module provides domain/URL validation and the CLI command runner.

pub mod commands;
pub mod url;

// Re-export public API
pub use commands::execute;
pub use url::{is_valid_archive_url, validate_domain};
