//! File I/O, validation and JSON artifacts for the quakealert pipeline.

mod domain;
mod error;
mod reader;
mod table;
mod writer;

pub use domain::{
    AlertClasses, Dataset, ExperimentName, ExploreColumns, FEATURE_COLUMNS, Record, TARGET_COLUMN,
};
pub use error::IoError;
pub use reader::EarthquakeReader;
pub use table::{MissingCount, MissingReport, NA_VALUES, RawTable, is_missing};
pub use writer::ResultWriter;
