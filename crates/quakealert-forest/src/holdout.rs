//! Shuffled hold-out split and single train/test evaluation.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::confusion::ConfusionMatrix;
use crate::error::ForestError;
use crate::importance::RankedFeature;
use crate::matrix::FeatureMatrix;
use crate::oob::OobScore;
use crate::report::ClassificationReport;
use crate::result::TrainingMetadata;

/// Hold-out split configuration.
///
/// Construct via [`TrainTestSplit::new`], then chain `with_seed` if desired.
/// The split is a plain shuffle; class proportions are not preserved.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    test_fraction: f64,
    seed: u64,
}

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Outcome of fitting on the train partition and scoring the test partition.
#[derive(Debug)]
pub struct HoldoutResult {
    /// Fraction of test rows predicted correctly.
    pub accuracy: f64,
    /// Confusion counts over the test rows.
    pub confusion_matrix: ConfusionMatrix,
    /// Per-class precision/recall/F1 over the test rows.
    pub report: ClassificationReport,
    /// Impurity-based importances of the fitted forest.
    pub feature_importances: Vec<RankedFeature>,
    /// Out-of-bag score on the train partition, when requested.
    pub oob_score: Option<OobScore>,
    pub metadata: TrainingMetadata,
    /// Predicted class per test row, in `test_indices` order.
    pub predictions: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub n_train: usize,
    pub n_test: usize,
}

impl TrainTestSplit {
    /// Create a split holding out `test_fraction` of the rows.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTestFraction`] unless `0 < test_fraction < 1`.
    pub fn new(test_fraction: f64) -> Result<Self, ForestError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(ForestError::InvalidTestFraction {
                fraction: test_fraction,
            });
        }
        Ok(Self {
            test_fraction,
            seed: 42,
        })
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of rows the test partition receives: `ceil(test_fraction * n)`.
    #[must_use]
    pub fn test_size(&self, n_samples: usize) -> usize {
        (self.test_fraction * n_samples as f64).ceil() as usize
    }

    /// Shuffle `0..n_samples` and cut it in two.
    ///
    /// The first `test_size(n_samples)` shuffled indices form the test set,
    /// the rest the train set. Both keep their shuffled order.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::DegenerateSplit`] when either side would be empty.
    pub fn split(&self, n_samples: usize) -> Result<SplitIndices, ForestError> {
        let n_test = self.test_size(n_samples).min(n_samples);
        let n_train = n_samples - n_test;
        if n_test == 0 || n_train == 0 {
            return Err(ForestError::DegenerateSplit {
                n_samples,
                fraction: self.test_fraction,
                n_train,
                n_test,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(&mut rng);
        let train = order.split_off(n_test);
        Ok(SplitIndices { train, test: order })
    }

    /// Fit `config` on the train partition and score it on the test partition.
    ///
    /// `class_names[c]` labels class index `c` in the report.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::LabelCountMismatch`] | `labels` and `features` differ in length |
    /// | [`ForestError::DegenerateSplit`] | A partition would be empty |
    /// | [`ForestError::ClassNameMismatch`] | `class_names.len() != n_classes` |
    /// | Other forest errors | From training or prediction |
    #[instrument(skip_all, fields(test_fraction = self.test_fraction, n_samples = features.n_samples()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        features: &FeatureMatrix,
        labels: &[usize],
        n_classes: usize,
        feature_names: &[String],
        class_names: &[String],
    ) -> Result<HoldoutResult, ForestError> {
        if labels.len() != features.n_samples() {
            return Err(ForestError::LabelCountMismatch {
                n_samples: features.n_samples(),
                n_labels: labels.len(),
            });
        }
        if class_names.len() != n_classes {
            return Err(ForestError::ClassNameMismatch {
                n_classes,
                n_names: class_names.len(),
            });
        }

        let SplitIndices { train, test } = self.split(features.n_samples())?;
        info!(n_train = train.len(), n_test = test.len(), "hold-out split");

        let train_features = features.select(&train);
        let train_labels: Vec<usize> = train.iter().map(|&i| labels[i]).collect();
        let test_features = features.select(&test);
        let test_labels: Vec<usize> = test.iter().map(|&i| labels[i]).collect();

        let fitted = config.fit(&train_features, &train_labels, n_classes, feature_names)?;
        let predictions = fitted.forest().predict_batch(&test_features)?;

        let confusion_matrix = ConfusionMatrix::from_labels(&test_labels, &predictions, n_classes)?;
        let report = ClassificationReport::from_confusion(&confusion_matrix, class_names)?;
        let accuracy = confusion_matrix.accuracy();
        info!(accuracy, "hold-out evaluation complete");

        Ok(HoldoutResult {
            accuracy,
            confusion_matrix,
            report,
            feature_importances: fitted.importances().to_vec(),
            oob_score: fitted.oob_score().cloned(),
            metadata: fitted.metadata().clone(),
            predictions,
            n_train: train.len(),
            n_test: test.len(),
            test_indices: test,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_ceiling() {
        let split = TrainTestSplit::new(0.2).unwrap();
        let s = split.split(1000).unwrap();
        assert_eq!(s.test.len(), 200);
        assert_eq!(s.train.len(), 800);
        let s = split.split(11).unwrap();
        assert_eq!(s.test.len(), 3);
        assert_eq!(s.train.len(), 8);
    }

    #[test]
    fn partitions_cover_every_row_once() {
        let s = TrainTestSplit::new(0.3).unwrap().split(50).unwrap();
        let mut all: Vec<usize> = s.train.iter().chain(&s.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn seed_controls_the_shuffle() {
        let a = TrainTestSplit::new(0.2).unwrap().with_seed(42).split(100).unwrap();
        let b = TrainTestSplit::new(0.2).unwrap().with_seed(42).split(100).unwrap();
        let c = TrainTestSplit::new(0.2).unwrap().with_seed(43).split(100).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn invalid_fraction_rejected() {
        for fraction in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                TrainTestSplit::new(fraction),
                Err(ForestError::InvalidTestFraction { .. })
            ));
        }
    }

    #[test]
    fn single_row_is_degenerate() {
        assert!(matches!(
            TrainTestSplit::new(0.2).unwrap().split(1),
            Err(ForestError::DegenerateSplit { n_samples: 1, n_train: 0, n_test: 1, .. })
        ));
        assert!(matches!(
            TrainTestSplit::new(0.2).unwrap().split(0),
            Err(ForestError::DegenerateSplit { n_samples: 0, .. })
        ));
    }

    #[test]
    fn evaluate_scores_the_test_partition() {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for class in 0..2 {
            for i in 0..25 {
                rows.push(vec![5.0 + class as f64 * 2.0 + i as f64 * 0.02, 10.0]);
                labels.push(class);
            }
        }
        let x = FeatureMatrix::from_rows(&rows).unwrap();
        let feature_names = vec!["magnitude".to_string(), "depth".to_string()];
        let class_names = vec!["green".to_string(), "red".to_string()];
        let config = RandomForestConfig::new(20).unwrap();
        let result = TrainTestSplit::new(0.2)
            .unwrap()
            .evaluate(&config, &x, &labels, 2, &feature_names, &class_names)
            .unwrap();
        assert_eq!(result.n_test, 10);
        assert_eq!(result.n_train, 40);
        assert_eq!(result.report.total_support, 10);
        assert_eq!(result.predictions.len(), result.test_indices.len());
        assert!(result.accuracy > 0.9, "accuracy = {}", result.accuracy);
    }

    #[test]
    fn evaluate_checks_class_names() {
        let x = FeatureMatrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let config = RandomForestConfig::new(2).unwrap();
        assert!(matches!(
            TrainTestSplit::new(0.5).unwrap().evaluate(
                &config,
                &x,
                &[0, 1, 0],
                2,
                &["magnitude".to_string()],
                &["green".to_string()]
            ),
            Err(ForestError::ClassNameMismatch { n_classes: 2, n_names: 1 })
        ));
    }
}
