//! Error handling.
//!
//! This module provides the error types of every subsystem and their
//! categorization into [`ErrorKind`]s:
//!
//! - **Row-level** problems (a malformed CDX row, an invalid imported URL) are
//!   recovered silently and never reach these types.
//! - **Request-level** problems (invalid domain, transport failure, remote
//!   error status) abort the ingestion for that domain.
//! - **Storage-level** problems (SQL errors, unusable import payloads) are
//!   always propagated; nothing is written.

mod types;

// Re-export public API
pub use types::{ErrorKind, FetchError, IngestError, InitializationError, StoreError};

/// Category of the first library error found in an error chain.
///
/// Used at the CLI boundary, where library errors arrive wrapped in
/// `anyhow` context. Returns `None` for errors raised outside the library
/// (bad arguments, unreadable files).
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<IngestError>() {
            Some(e.kind())
        } else {
            cause.downcast_ref::<StoreError>().map(StoreError::kind)
        }
    })
}
