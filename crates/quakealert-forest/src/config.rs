//! Configuration builder for random forest training.

use crate::criterion::SplitCriterion;
use crate::error::ForestError;
use crate::matrix::FeatureMatrix;
use crate::result::RandomForestResult;

/// Number of features each split considers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// `floor(log2(n_features))`, at least 1.
    Log2,
    /// `floor(fraction * n_features)`, at least 1.
    Fraction(f64),
    /// A fixed count.
    Fixed(usize),
    /// Every feature.
    All,
}

/// Whether to compute out-of-bag accuracy during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OobMode {
    /// Compute OOB accuracy and confusion counts.
    Enabled,
    /// Skip OOB evaluation.
    Disabled,
}

/// How tree outputs are combined into one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voting {
    /// Each tree casts one vote for its predicted class; ties go to the lowest class.
    Majority,
    /// Leaf class distributions are averaged and the argmax wins.
    Soft,
}

/// Configuration for random forest training.
///
/// # Defaults
///
/// | Parameter            | Default     |
/// |----------------------|-------------|
/// | `max_features`       | `Sqrt`      |
/// | `max_depth`          | `None`      |
/// | `min_samples_split`  | 2           |
/// | `min_samples_leaf`   | 1           |
/// | `criterion`          | `Gini`      |
/// | `voting`             | `Majority`  |
/// | `seed`               | 42          |
/// | `oob_mode`           | `Disabled`  |
///
/// Every tree is grown on a bootstrap sample the size of the training set.
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) voting: Voting,
    pub(crate) seed: u64,
    pub(crate) oob_mode: OobMode,
}

impl RandomForestConfig {
    /// Create a config with `n_trees` trees and the documented defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            voting: Voting::Majority,
            seed: 42,
            oob_mode: OobMode::Disabled,
        })
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    #[must_use]
    pub fn with_voting(mut self, voting: Voting) -> Self {
        self.voting = voting;
        self
    }

    /// Set the master seed from which every per-tree seed is drawn.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.oob_mode = oob_mode;
        self
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    #[must_use]
    pub fn voting(&self) -> Voting {
        self.voting
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn oob_mode(&self) -> OobMode {
        self.oob_mode
    }

    /// Train a forest.
    ///
    /// `labels[i]` is the zero-based class of row `i`; `n_classes` is the
    /// size of the class universe, so classes absent from this particular
    /// training set still get a slot in every distribution.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                                             |
    /// |------------------------------------------|--------------------------------------------------|
    /// | [`ForestError::LabelCountMismatch`]      | `labels.len() != features.n_samples()`           |
    /// | [`ForestError::UnknownClass`]            | a label is `>= n_classes`                        |
    /// | [`ForestError::InvalidMaxFeatures`]      | resolved max_features outside `[1, n_features]`  |
    /// | [`ForestError::InvalidMaxDepth`] etc.    | invalid per-tree settings                        |
    /// | [`ForestError::OobEvaluationFailed`]     | OOB enabled but no sample was ever out of bag    |
    pub fn fit(
        &self,
        features: &FeatureMatrix,
        labels: &[usize],
        n_classes: usize,
        feature_names: &[String],
    ) -> Result<RandomForestResult, ForestError> {
        crate::forest::train(self, features, labels, n_classes, feature_names)
    }
}
