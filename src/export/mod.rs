//! Export and import codecs for stored datasets.
//!
//! This module converts datasets to and from the three file formats (JSON,
//! plain text, CSV) and the whole-store backup document. It only encodes and
//! decodes; URL validation and persistence happen in [`crate::storage`].

mod backup;
mod csv;
mod json;
mod text;
mod types;

pub use backup::{parse_backup, BackupDocument, RestoredDataset};
pub use self::csv::CSV_HEADER;
pub use types::DataFormat;

use crate::error_handling::StoreError;
use crate::models::{Dataset, UrlRecord};

/// Serializes a dataset in `format`.
///
/// # Errors
///
/// Returns `StoreError::Serialization` or `StoreError::Csv` when encoding fails.
pub fn serialize_dataset(dataset: &Dataset, format: DataFormat) -> Result<String, StoreError> {
    match format {
        DataFormat::Json => json::dataset_to_json(dataset),
        DataFormat::Txt => Ok(text::dataset_to_text(dataset)),
        DataFormat::Csv => csv::dataset_to_csv(dataset),
    }
}

/// Serializes a bare record list in `format`.
///
/// Used for filtered exports: JSON is an array of records instead of a
/// dataset object; text and CSV match [`serialize_dataset`].
///
/// # Errors
///
/// Returns `StoreError::Serialization` or `StoreError::Csv` when encoding fails.
pub fn serialize_records(records: &[UrlRecord], format: DataFormat) -> Result<String, StoreError> {
    match format {
        DataFormat::Json => json::records_to_json(records),
        DataFormat::Txt => Ok(text::records_to_text(records)),
        DataFormat::Csv => csv::records_to_csv(records),
    }
}

/// Decodes an import payload into candidate records (not yet validated).
///
/// # Errors
///
/// Returns `StoreError::Import` when a JSON payload has an unrecognized shape.
/// Text and CSV decoding never fail; unusable lines are skipped.
pub fn parse_records(data: &str, format: DataFormat) -> Result<Vec<UrlRecord>, StoreError> {
    match format {
        DataFormat::Json => json::records_from_json(data),
        DataFormat::Txt => Ok(text::records_from_text(data)),
        DataFormat::Csv => Ok(csv::records_from_csv(data)),
    }
}
