//! The raw table as read from disk and its missing-value report.

use std::fmt;

use serde::Serialize;

/// Cell spellings read as "no value", in addition to the empty cell.
pub const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether `cell` counts as missing.
#[must_use]
pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_VALUES.contains(&cell)
}

/// Header plus rows of cells, with missing cells already mapped to `None`.
///
/// Produced by [`EarthquakeReader::read_table`](crate::EarthquakeReader::read_table).
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub(crate) fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == headers.len()));
        Self { headers, rows }
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    /// Position of the first column named `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Count missing cells per column, in header order.
    #[must_use]
    pub fn missing_counts(&self) -> MissingReport {
        let mut counts = vec![0usize; self.headers.len()];
        for row in &self.rows {
            for (count, cell) in counts.iter_mut().zip(row) {
                if cell.is_none() {
                    *count += 1;
                }
            }
        }
        MissingReport {
            columns: self
                .headers
                .iter()
                .zip(counts)
                .map(|(column, missing)| MissingCount {
                    column: column.clone(),
                    missing,
                })
                .collect(),
        }
    }
}

/// Missing cells in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// Missing-value counts for every column of a [`RawTable`].
///
/// Purely informational. `Display` prints one line per column with the
/// names left-aligned and the counts right-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingReport {
    pub columns: Vec<MissingCount>,
}

impl MissingReport {
    /// Missing cells across all columns.
    #[must_use]
    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }

    /// Count for `column`, if the table has it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<usize> {
        self.columns.iter().find(|c| c.column == column).map(|c| c.missing)
    }
}

impl fmt::Display for MissingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self.columns.iter().map(|c| c.column.chars().count()).max().unwrap_or(0);
        let count_width = self
            .columns
            .iter()
            .map(|c| c.missing.to_string().len())
            .max()
            .unwrap_or(1);
        for c in &self.columns {
            writeln!(f, "{:<name_width$}    {:>count_width$}", c.column, c.missing)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        (!is_missing(s)).then(|| s.to_string())
    }

    fn table() -> RawTable {
        let headers = vec!["magnitude".to_string(), "sig".to_string(), "alert".to_string()];
        let rows = vec![
            vec![cell("7.0"), cell("768"), cell("green")],
            vec![cell(""), cell("NA"), cell("yellow")],
            vec![cell("6.9"), cell("nan"), cell("")],
        ];
        RawTable::new(headers, rows)
    }

    #[test]
    fn na_spellings() {
        for s in ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "<NA>", "#N/A", "-nan"] {
            assert!(is_missing(s), "{s:?} should be missing");
        }
        for s in ["0", "green", "na", " "] {
            assert!(!is_missing(s), "{s:?} should be present");
        }
    }

    #[test]
    fn counts_per_column_in_header_order() {
        let report = table().missing_counts();
        let pairs: Vec<(&str, usize)> =
            report.columns.iter().map(|c| (c.column.as_str(), c.missing)).collect();
        assert_eq!(pairs, vec![("magnitude", 1), ("sig", 2), ("alert", 1)]);
        assert_eq!(report.total(), 4);
        assert_eq!(report.get("sig"), Some(2));
        assert_eq!(report.get("depth"), None);
    }

    #[test]
    fn display_aligns_columns() {
        let text = table().missing_counts().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["magnitude    1", "sig          2", "alert        1"]);
    }

    #[test]
    fn column_lookup() {
        let t = table();
        assert_eq!(t.column_index("alert"), Some(2));
        assert_eq!(t.column_index("cdi"), None);
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.n_columns(), 3);
    }
}
