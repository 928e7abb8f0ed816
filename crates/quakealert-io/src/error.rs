//! I/O error types for quakealert-io.

use std::path::PathBuf;

use quakealert_forest::ForestError;

/// Errors from loading the catalogue, converting it to records and writing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the input file exists but cannot be opened.
    #[error("failed to open {path}")]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        source: csv::Error,
    },

    /// Returned when the file has a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        path: PathBuf,
    },

    /// Returned when a data row has a different number of cells than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        expected: usize,
        got: usize,
    },

    /// Returned when a required column is absent from the header.
    #[error("required column \"{column}\" is missing")]
    MissingColumn {
        column: &'static str,
    },

    /// Returned when a required cell is empty or an NA spelling.
    #[error("row {row}: required column \"{column}\" has no value")]
    MissingValue {
        /// Zero-based row index (excluding header).
        row: usize,
        column: &'static str,
    },

    /// Returned when a real-valued cell is unparseable or not finite.
    #[error("row {row}: column \"{column}\" is not a finite number: \"{raw}\"")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        raw: String,
    },

    /// Returned when an integer cell is unparseable or has a fractional part.
    #[error("row {row}: column \"{column}\" is not an integer: \"{raw}\"")]
    InvalidInteger {
        row: usize,
        column: &'static str,
        raw: String,
    },

    /// Returned when an alert label is not among the encoding classes.
    #[error("alert label \"{label}\" is not one of the known classes")]
    UnknownAlert {
        label: String,
    },

    /// Wraps a feature matrix construction error.
    #[error("cannot build feature matrix: {0}")]
    Features(#[from] ForestError),

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Returned when an artifact cannot be encoded as JSON.
    #[error("cannot serialize {path}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
