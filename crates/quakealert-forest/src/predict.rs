//! Prediction for the fitted ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::config::Voting;
use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::matrix::FeatureMatrix;
use crate::tree::majority_class;

/// Per-class scores for one sample.
///
/// Under [`Voting::Majority`] these are vote shares; under [`Voting::Soft`]
/// they are averaged leaf distributions. Either way they sum to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    /// Argmax class; the lowest index wins ties.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        let mut best = 0;
        for (class, &p) in self.probs.iter().enumerate() {
            if p > self.probs[best] {
                best = class;
            }
        }
        best
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }
}

impl RandomForest {
    /// Predict the class of one sample.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `sample` has the wrong width.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        match self.voting {
            Voting::Majority => Ok(majority_class(&self.votes(sample)?)),
            Voting::Soft => Ok(self.predict_proba(sample)?.predicted_class()),
        }
    }

    /// Class scores for one sample, combined according to the forest's voting mode.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `sample` has the wrong width.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, ForestError> {
        let n_trees = self.trees.len() as f64;
        let probs = match self.voting {
            Voting::Majority => self
                .votes(sample)?
                .into_iter()
                .map(|v| v as f64 / n_trees)
                .collect(),
            Voting::Soft => {
                self.check_width(sample)?;
                let mut sum = vec![0.0; self.n_classes];
                for tree in &self.trees {
                    for (acc, p) in sum.iter_mut().zip(tree.predict_proba(sample)?) {
                        *acc += p;
                    }
                }
                sum.into_iter().map(|s| s / n_trees).collect()
            }
        };
        Ok(ClassDistribution { probs })
    }

    /// Predict every row of `features` in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when the matrix has the wrong width.
    pub fn predict_batch(&self, features: &FeatureMatrix) -> Result<Vec<usize>, ForestError> {
        self.check_width_of(features.n_features())?;
        (0..features.n_samples())
            .into_par_iter()
            .map(|i| self.predict(features.row(i)))
            .collect()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn votes(&self, sample: &[f64]) -> Result<Vec<usize>, ForestError> {
        self.check_width(sample)?;
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(sample)?] += 1;
        }
        Ok(votes)
    }

    fn check_width(&self, sample: &[f64]) -> Result<(), ForestError> {
        self.check_width_of(sample.len())
    }

    fn check_width_of(&self, got: usize) -> Result<(), ForestError> {
        if got != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got,
            });
        }
        Ok(())
    }
}
