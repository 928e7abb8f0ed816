//! CSV reader for the earthquake alert catalogue.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::Dataset;
use crate::table::{RawTable, is_missing};

/// Reads the earthquake catalogue from a delimited text file.
///
/// Expected format: a header row naming at least `magnitude, depth, cdi,
/// mmi, sig, alert` (any order, extra columns allowed), then one row per
/// event with as many cells as the header.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist |
/// | [`IoError::FileOpen`] | File exists but cannot be opened |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
pub struct EarthquakeReader {
    path: PathBuf,
}

impl EarthquakeReader {
    /// Create a reader for the CSV file at `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file into a [`RawTable`] without interpreting any cell.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read_table(&self) -> Result<RawTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            let path = self.path.clone();
            if e.kind() == std::io::ErrorKind::NotFound {
                IoError::FileNotFound { path, source: e }
            } else {
                IoError::FileOpen { path, source: e }
            }
        })?;

        // flexible(true) lets short or long rows through so that
        // InconsistentRowLength fires instead of a bare CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| self.parse_error(e))?
            .iter()
            .map(str::to_string)
            .collect();
        let expected = headers.len();
        debug!(expected, "read CSV header");

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }
            rows.push(
                record
                    .iter()
                    .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
                    .collect(),
            );
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_rows = rows.len(), n_columns = expected, "table loaded");
        Ok(RawTable::new(headers, rows))
    }

    /// Read the file and convert it straight to a typed [`Dataset`].
    ///
    /// # Errors
    ///
    /// Any error from [`read_table`](Self::read_table) or [`Dataset::from_table`].
    pub fn read_dataset(&self) -> Result<Dataset, IoError> {
        Dataset::from_table(&self.read_table()?)
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
