//! Export types.

use clap::ValueEnum;
use strum_macros::{Display, EnumIter, EnumString};

/// File format of a single-domain export or import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, EnumIter, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DataFormat {
    /// The full dataset as pretty-printed JSON
    Json,
    /// One URL per line
    Txt,
    /// Header `URL,Status Code,Timestamp`, one row per record
    Csv,
}

impl DataFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Txt => "txt",
            DataFormat::Csv => "csv",
        }
    }

    /// Guesses the format from a file name's extension.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}
