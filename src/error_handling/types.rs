//! Error type definitions.
//!
//! This module defines all error types used throughout the application and the
//! coarse [`ErrorKind`] category each of them maps to.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured CDX endpoint is not a valid URL.
    #[error("Invalid CDX endpoint: {0}")]
    EndpointError(#[from] url::ParseError),
}

/// Error returned by the retrying fetcher.
///
/// Only transport failures surface here. HTTP responses of any status are
/// handed back to the caller, which decides what a non-2xx status means.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No usable response after the whole retry budget.
    #[error("Request to {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: ReqwestError,
    },
}

/// Error types for store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreation(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing a tabular export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No dataset is stored for the domain.
    #[error("No data found for domain {0}")]
    NotFound(String),

    /// Import payload unusable: unrecognized shape or no valid URL.
    #[error("Import failed: {0}")]
    Import(String),
}

/// Error types for an ingestion run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Malformed domain name, rejected before any network call.
    #[error("Invalid domain format: {0:?}")]
    InvalidInput(String),

    /// Network failure after all retries.
    #[error(transparent)]
    Transport(#[from] FetchError),

    /// The CDX server answered with a non-success status.
    #[error("CDX API request failed: HTTP {status} for {url}")]
    Remote { status: u16, url: String },

    /// Persisting the dataset failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Coarse error categories reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    InvalidInput,
    TransportFailure,
    RemoteError,
    ImportFailure,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Invalid input",
            ErrorKind::TransportFailure => "Transport failure",
            ErrorKind::RemoteError => "Remote error",
            ErrorKind::ImportFailure => "Import failure",
            ErrorKind::StorageFailure => "Storage failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Import(_) => ErrorKind::ImportFailure,
            StoreError::NotFound(_) => ErrorKind::InvalidInput,
            _ => ErrorKind::StorageFailure,
        }
    }
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::InvalidInput(_) => ErrorKind::InvalidInput,
            IngestError::Transport(_) => ErrorKind::TransportFailure,
            IngestError::Remote { .. } => ErrorKind::RemoteError,
            IngestError::Storage(e) => e.kind(),
        }
    }
}
