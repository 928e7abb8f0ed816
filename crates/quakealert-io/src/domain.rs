//! Domain types for quakealert-io.

use quakealert_eda::ExploreInput;
use quakealert_forest::FeatureMatrix;
use tracing::debug;

use crate::IoError;
use crate::table::RawTable;

/// Feature columns, in the order of every feature row.
pub const FEATURE_COLUMNS: [&str; 5] = ["magnitude", "depth", "cdi", "mmi", "sig"];

/// The categorical target column.
pub const TARGET_COLUMN: &str = "alert";

/// One earthquake event.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub magnitude: f64,
    /// Hypocentre depth in km.
    pub depth: f64,
    /// Community Determined Intensity.
    pub cdi: i64,
    /// Modified Mercalli Intensity.
    pub mmi: i64,
    /// Composite significance score.
    pub sig: i64,
    pub alert: String,
}

impl Record {
    /// Feature values in [`FEATURE_COLUMNS`] order.
    #[must_use]
    pub fn features(&self) -> [f64; 5] {
        [
            self.magnitude,
            self.depth,
            self.cdi as f64,
            self.mmi as f64,
            self.sig as f64,
        ]
    }
}

/// Distinct alert labels in lexicographic order; class `i` is `names()[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertClasses(Vec<String>);

impl AlertClasses {
    /// Collect the distinct labels of `labels`.
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut names: Vec<String> = labels.into_iter().map(str::to_string).collect();
        names.sort_unstable();
        names.dedup();
        Self(names)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Class index of `label`.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.0.binary_search_by(|name| name.as_str().cmp(label)).ok()
    }
}

/// Typed earthquake records plus the names of columns that were read but not used.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    passthrough_columns: Vec<String>,
}

/// Owned exploration columns; borrow them as an [`ExploreInput`].
#[derive(Debug, Clone)]
pub struct ExploreColumns {
    pub magnitude: Vec<f64>,
    pub depth: Vec<f64>,
    pub sig: Vec<f64>,
    pub alert: Vec<String>,
}

impl ExploreColumns {
    #[must_use]
    pub fn as_input(&self) -> ExploreInput<'_> {
        ExploreInput {
            magnitude: &self.magnitude,
            depth: &self.depth,
            sig: &self.sig,
            alert: &self.alert,
        }
    }
}

impl Dataset {
    /// Convert every row of `table` into a [`Record`].
    ///
    /// `cdi`, `mmi` and `sig` accept whole numbers written with a trailing
    /// `.0`; a fractional part is an error.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::MissingColumn`] | a feature or the target column is absent |
    /// | [`IoError::MissingValue`] | a required cell is missing |
    /// | [`IoError::InvalidNumber`] | `magnitude` or `depth` is not a finite number |
    /// | [`IoError::InvalidInteger`] | `cdi`, `mmi` or `sig` is not an integer |
    pub fn from_table(table: &RawTable) -> Result<Self, IoError> {
        let column = |name: &'static str| {
            table
                .column_index(name)
                .ok_or(IoError::MissingColumn { column: name })
        };
        let [magnitude, depth, cdi, mmi, sig] = [
            column(FEATURE_COLUMNS[0])?,
            column(FEATURE_COLUMNS[1])?,
            column(FEATURE_COLUMNS[2])?,
            column(FEATURE_COLUMNS[3])?,
            column(FEATURE_COLUMNS[4])?,
        ];
        let alert = column(TARGET_COLUMN)?;

        let records = table
            .rows()
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let cell = |index: usize, name: &'static str| {
                    cells[index]
                        .as_deref()
                        .ok_or(IoError::MissingValue { row, column: name })
                };
                Ok(Record {
                    magnitude: parse_real(row, "magnitude", cell(magnitude, "magnitude")?)?,
                    depth: parse_real(row, "depth", cell(depth, "depth")?)?,
                    cdi: parse_integer(row, "cdi", cell(cdi, "cdi")?)?,
                    mmi: parse_integer(row, "mmi", cell(mmi, "mmi")?)?,
                    sig: parse_integer(row, "sig", cell(sig, "sig")?)?,
                    alert: cell(alert, TARGET_COLUMN)?.to_string(),
                })
            })
            .collect::<Result<Vec<_>, IoError>>()?;

        let passthrough_columns: Vec<String> = table
            .headers()
            .iter()
            .filter(|h| h.as_str() != TARGET_COLUMN && !FEATURE_COLUMNS.contains(&h.as_str()))
            .cloned()
            .collect();
        debug!(
            n_records = records.len(),
            n_passthrough = passthrough_columns.len(),
            "records converted"
        );

        Ok(Self {
            records,
            passthrough_columns,
        })
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header names other than the features and the target.
    #[must_use]
    pub fn passthrough_columns(&self) -> &[String] {
        &self.passthrough_columns
    }

    /// Names of the feature columns, in matrix column order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect()
    }

    /// One row per record, columns in [`FEATURE_COLUMNS`] order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Features`] when the dataset is empty.
    pub fn feature_matrix(&self) -> Result<FeatureMatrix, IoError> {
        let rows: Vec<Vec<f64>> = self.records.iter().map(|r| r.features().to_vec()).collect();
        Ok(FeatureMatrix::from_rows(&rows)?)
    }

    /// The sorted set of alert labels present in the dataset.
    #[must_use]
    pub fn alert_classes(&self) -> AlertClasses {
        AlertClasses::from_labels(self.records.iter().map(|r| r.alert.as_str()))
    }

    /// Class index of every record's alert under `classes`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownAlert`] for a label `classes` does not contain.
    pub fn encoded_labels(&self, classes: &AlertClasses) -> Result<Vec<usize>, IoError> {
        self.records
            .iter()
            .map(|r| {
                classes.index_of(&r.alert).ok_or_else(|| IoError::UnknownAlert {
                    label: r.alert.clone(),
                })
            })
            .collect()
    }

    /// The columns the exploration summary reads.
    #[must_use]
    pub fn explore_columns(&self) -> ExploreColumns {
        ExploreColumns {
            magnitude: self.records.iter().map(|r| r.magnitude).collect(),
            depth: self.records.iter().map(|r| r.depth).collect(),
            sig: self.records.iter().map(|r| r.sig as f64).collect(),
            alert: self.records.iter().map(|r| r.alert.clone()).collect(),
        }
    }
}

fn parse_real(row: usize, column: &'static str, raw: &str) -> Result<f64, IoError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(IoError::InvalidNumber {
            row,
            column,
            raw: raw.to_string(),
        }),
    }
}

fn parse_integer(row: usize, column: &'static str, raw: &str) -> Result<i64, IoError> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Ok(value as i64)
        }
        _ => Err(IoError::InvalidInteger {
            row,
            column,
            raw: raw.to_string(),
        }),
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| {
                    r.iter()
                        .map(|c| (!crate::table::is_missing(c)).then(|| c.to_string()))
                        .collect()
                })
                .collect(),
        )
    }

    const HEADERS: [&str; 7] = ["magnitude", "depth", "cdi", "mmi", "sig", "alert", "tsunami"];

    #[test]
    fn converts_rows_in_order() {
        let t = table(
            &HEADERS,
            &[
                &["7.0", "14", "8", "7", "768", "green", "0"],
                &["6.9", "25.5", "4.0", "4", "735", "yellow", "1"],
            ],
        );
        let ds = Dataset::from_table(&t).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].depth, 25.5);
        assert_eq!(ds.records()[1].cdi, 4);
        assert_eq!(ds.passthrough_columns(), &["tsunami".to_string()]);
        assert_eq!(ds.records()[0].features(), [7.0, 14.0, 8.0, 7.0, 768.0]);
    }

    #[test]
    fn columns_may_appear_in_any_order() {
        let t = table(
            &["alert", "sig", "mmi", "cdi", "depth", "magnitude"],
            &[&["red", "1200", "9", "8", "30", "8.1"]],
        );
        let ds = Dataset::from_table(&t).unwrap();
        assert_eq!(ds.records()[0].features(), [8.1, 30.0, 8.0, 9.0, 1200.0]);
    }

    #[test]
    fn missing_column_reported() {
        let t = table(&["magnitude", "depth", "cdi", "mmi", "alert"], &[&["7", "1", "1", "1", "red"]]);
        assert!(matches!(
            Dataset::from_table(&t),
            Err(IoError::MissingColumn { column: "sig" })
        ));
    }

    #[test]
    fn missing_value_reported_with_row() {
        let t = table(
            &HEADERS,
            &[
                &["7.0", "14", "8", "7", "768", "green", "0"],
                &["6.9", "NA", "4", "4", "735", "yellow", "0"],
            ],
        );
        assert!(matches!(
            Dataset::from_table(&t),
            Err(IoError::MissingValue { row: 1, column: "depth" })
        ));
    }

    #[test]
    fn fractional_integer_rejected() {
        let t = table(&HEADERS, &[&["7.0", "14", "5.5", "7", "768", "green", "0"]]);
        assert!(matches!(
            Dataset::from_table(&t),
            Err(IoError::InvalidInteger { row: 0, column: "cdi", .. })
        ));
    }

    #[test]
    fn infinite_real_rejected() {
        let t = table(&HEADERS, &[&["inf", "14", "5", "7", "768", "green", "0"]]);
        assert!(matches!(
            Dataset::from_table(&t),
            Err(IoError::InvalidNumber { column: "magnitude", .. })
        ));
    }

    #[test]
    fn classes_are_sorted_and_encoded() {
        let t = table(
            &HEADERS,
            &[
                &["7.0", "14", "8", "7", "768", "yellow", "0"],
                &["6.9", "25", "4", "4", "735", "green", "0"],
                &["8.0", "10", "9", "9", "1500", "red", "0"],
                &["7.5", "40", "7", "8", "900", "green", "0"],
            ],
        );
        let ds = Dataset::from_table(&t).unwrap();
        let classes = ds.alert_classes();
        assert_eq!(classes.names(), &["green", "red", "yellow"]);
        assert_eq!(ds.encoded_labels(&classes).unwrap(), vec![2, 0, 1, 0]);

        let narrow = AlertClasses::from_labels(["green"]);
        assert!(matches!(
            ds.encoded_labels(&narrow),
            Err(IoError::UnknownAlert { .. })
        ));
    }

    #[test]
    fn feature_matrix_shape() {
        let t = table(&HEADERS, &[&["7.0", "14", "8", "7", "768", "green", "0"]]);
        let x = Dataset::from_table(&t).unwrap().feature_matrix().unwrap();
        assert_eq!(x.n_samples(), 1);
        assert_eq!(x.n_features(), 5);
        assert_eq!(x.row(0), &[7.0, 14.0, 8.0, 7.0, 768.0]);
    }

    #[test]
    fn experiment_name_validation() {
        assert!(ExperimentName::new("run_01-a".to_string()).is_ok());
        for bad in ["", "has space", "dot.json", "slash/x"] {
            assert!(matches!(
                ExperimentName::new(bad.to_string()),
                Err(IoError::InvalidExperimentName { .. })
            ));
        }
    }
}
