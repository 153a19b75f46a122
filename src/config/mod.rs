//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoint, limits, retry timings, storage keys)
//! - Library configuration and option types
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Cli, Command, FetchArgs, FilterArgs};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, QueryMode, QueryOptions};
