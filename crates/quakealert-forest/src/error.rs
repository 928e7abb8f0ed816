/// Errors from forest training, splitting and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when min_samples_split is less than 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid min_samples_split value provided.
        min_samples_split: usize,
    },

    /// Returned when min_samples_leaf is zero.
    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf {
        /// The invalid min_samples_leaf value provided.
        min_samples_leaf: usize,
    },

    /// Returned when max_features resolves to 0 or exceeds n_features.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved max_features value.
        max_features: usize,
        /// The number of feature columns.
        n_features: usize,
    },

    /// Returned when the hold-out test fraction is not in (0.0, 1.0).
    #[error("test_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction.
        fraction: f64,
    },

    /// Returned when a train/test split would leave one side empty.
    #[error("cannot split {n_samples} samples with test_fraction {fraction}: train has {n_train}, test has {n_test}")]
    DegenerateSplit {
        /// Total number of samples.
        n_samples: usize,
        /// Requested test fraction.
        fraction: f64,
        /// Resulting train partition size.
        n_train: usize,
        /// Resulting test partition size.
        n_test: usize,
    },

    /// Returned when the feature matrix has zero rows.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when rows have zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a row has a different width than the first row.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
        /// Zero-based index of the offending row.
        sample_index: usize,
    },

    /// Returned when the label vector length differs from the sample count.
    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of samples in the feature matrix.
        n_samples: usize,
        /// Number of labels provided.
        n_labels: usize,
    },

    /// Returned when a feature value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// Zero-based row index.
        sample_index: usize,
        /// Zero-based column index.
        feature_index: usize,
    },

    /// Returned when a prediction input has the wrong width.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// Width the forest was trained on.
        expected: usize,
        /// Width of the prediction input.
        got: usize,
    },

    /// Returned when a label falls outside the known class range.
    #[error("label {label} is outside the {n_classes} known classes")]
    UnknownClass {
        /// The out-of-range label.
        label: usize,
        /// Number of known classes.
        n_classes: usize,
    },

    /// Returned when true and predicted label vectors differ in length.
    #[error("got {n_true} true labels but {n_predicted} predictions")]
    PredictionCountMismatch {
        /// Number of true labels.
        n_true: usize,
        /// Number of predictions.
        n_predicted: usize,
    },

    /// Returned when the number of class names does not cover the class count.
    #[error("got {n_names} class names for {n_classes} classes")]
    ClassNameMismatch {
        /// Number of classes in the confusion matrix.
        n_classes: usize,
        /// Number of names provided.
        n_names: usize,
    },

    /// Returned when OOB evaluation is requested but no sample is ever out of bag.
    #[error("OOB evaluation failed: {reason}")]
    OobEvaluationFailed {
        /// Why OOB evaluation failed.
        reason: String,
    },
}
