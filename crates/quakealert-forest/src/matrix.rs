//! Validated dense feature matrix.

use crate::error::ForestError;

/// A dense, row-major matrix of finite feature values.
///
/// All rows share the same width. Construction rejects empty input,
/// ragged rows and NaN/infinite values, so downstream training code can
/// index freely.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Vec<f64>,
    n_samples: usize,
    n_features: usize,
}

impl FeatureMatrix {
    /// Build a matrix from row vectors.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                              |
    /// |---------------------------------------|-----------------------------------|
    /// | [`ForestError::EmptyDataset`]         | `rows` is empty                   |
    /// | [`ForestError::ZeroFeatures`]         | the first row is empty            |
    /// | [`ForestError::FeatureCountMismatch`] | a row differs in width            |
    /// | [`ForestError::NonFiniteValue`]       | any value is NaN or infinite      |
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ForestError> {
        let first = rows.first().ok_or(ForestError::EmptyDataset)?;
        let n_features = first.len();
        if n_features == 0 {
            return Err(ForestError::ZeroFeatures);
        }

        let mut values = Vec::with_capacity(rows.len() * n_features);
        for (sample_index, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(ForestError::FeatureCountMismatch {
                    expected: n_features,
                    got: row.len(),
                    sample_index,
                });
            }
            if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
                return Err(ForestError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
            values.extend_from_slice(row);
        }

        Ok(Self {
            values,
            n_samples: rows.len(),
            n_features,
        })
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Borrow row `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index >= n_samples`.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.n_features;
        &self.values[start..start + self.n_features]
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.values.chunks_exact(self.n_features)
    }

    /// Copy the given rows (in the given order, repeats allowed) into a new matrix.
    ///
    /// # Panics
    ///
    /// Panics when an index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut values = Vec::with_capacity(indices.len() * self.n_features);
        for &i in indices {
            values.extend_from_slice(self.row(i));
        }
        Self {
            values,
            n_samples: indices.len(),
            n_features: self.n_features,
        }
    }

    /// Transpose into one `Vec` per feature column.
    pub(crate) fn columns(&self) -> Vec<Vec<f64>> {
        (0..self.n_features)
            .map(|f| self.rows().map(|row| row[f]).collect())
            .collect()
    }
}
