use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    ForestError,
    criterion::{SplitCriterion, SplitSearch},
    matrix::FeatureMatrix,
    node::{Node, NodeIndex},
};

/// Configuration for a single CART decision tree.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a config with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum depth (root is depth 0). `None` grows until leaves are pure.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples each child must keep.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set how many randomly chosen features each split considers.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for feature subsampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit a tree; the class count is inferred as `max(label) + 1`.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                                         |
    /// |----------------------------------------|----------------------------------------------|
    /// | [`ForestError::LabelCountMismatch`]    | `labels.len() != features.n_samples()`       |
    /// | [`ForestError::InvalidMaxDepth`]       | `max_depth` is `Some(0)`                     |
    /// | [`ForestError::InvalidMinSamplesSplit`]| `min_samples_split < 2`                      |
    /// | [`ForestError::InvalidMinSamplesLeaf`] | `min_samples_leaf < 1`                       |
    /// | [`ForestError::InvalidMaxFeatures`]    | `max_features` outside `[1, n_features]`     |
    pub fn fit(&self, features: &FeatureMatrix, labels: &[usize]) -> Result<DecisionTree, ForestError> {
        let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
        self.fit_with_classes(features, labels, n_classes)
    }

    /// Fit a tree whose leaf distributions span exactly `n_classes` classes.
    #[instrument(skip_all, fields(n_samples = features.n_samples(), n_classes = n_classes))]
    pub(crate) fn fit_with_classes(
        &self,
        features: &FeatureMatrix,
        labels: &[usize],
        n_classes: usize,
    ) -> Result<DecisionTree, ForestError> {
        if labels.len() != features.n_samples() {
            return Err(ForestError::LabelCountMismatch {
                n_samples: features.n_samples(),
                n_labels: labels.len(),
            });
        }
        if let Some(&label) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(ForestError::UnknownClass { label, n_classes });
        }
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(ForestError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        let n_features = features.n_features();
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let columns = features.columns();
        let mut builder = TreeBuilder {
            search: SplitSearch {
                columns: &columns,
                labels,
                n_classes,
                criterion: self.criterion,
                max_features,
                min_samples_leaf: self.min_samples_leaf,
            },
            config: self,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        let samples: Vec<usize> = (0..features.n_samples()).collect();
        builder.grow(&samples, 0);

        debug!(n_nodes = builder.arena.len(), "decision tree built");

        Ok(DecisionTree {
            nodes: builder.arena,
            n_features,
            n_classes,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursive arena builder for one tree.
struct TreeBuilder<'a> {
    search: SplitSearch<'a>,
    config: &'a DecisionTreeConfig,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `samples` and return its root index.
    fn grow(&mut self, samples: &[usize], depth: usize) -> NodeIndex {
        let n_samples = samples.len();
        let mut counts = vec![0usize; self.search.n_classes];
        for &s in samples {
            counts[self.search.labels[s]] += 1;
        }
        let impurity = self.config.criterion.impurity(&counts, n_samples);

        let stop = impurity.is_pure()
            || n_samples < self.config.min_samples_split
            || self.config.max_depth.is_some_and(|d| depth >= d);
        let split = if stop {
            None
        } else {
            self.search.best_split(samples, &counts, impurity, &mut self.rng)
        };

        let Some(split) = split else {
            let total = n_samples.max(1) as f64;
            let prediction = majority_class(&counts);
            self.arena.push(Node::Leaf {
                prediction,
                distribution: counts.iter().map(|&c| c as f64 / total).collect(),
                impurity,
                n_samples,
            });
            return NodeIndex::new(self.arena.len() - 1);
        };

        // Reserve this node's slot so children get later indices.
        let index = self.arena.len();
        self.arena.push(Node::Leaf {
            prediction: 0,
            distribution: Vec::new(),
            impurity,
            n_samples,
        });
        let left = self.grow(&split.left, depth + 1);
        let right = self.grow(&split.right, depth + 1);
        self.arena[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
            impurity_decrease: split.impurity_decrease,
        };
        NodeIndex::new(index)
    }
}

/// Index of the largest count; the lowest index wins ties.
pub(crate) fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

/// A fitted CART decision tree stored as a node arena.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class of one sample.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `sample` has the wrong width.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        match self.leaf(sample)? {
            Node::Leaf { prediction, .. } => Ok(*prediction),
            Node::Split { .. } => unreachable!("leaf() always returns a leaf"),
        }
    }

    /// Return the leaf class distribution for one sample (length `n_classes`).
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `sample` has the wrong width.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], ForestError> {
        match self.leaf(sample)? {
            Node::Leaf { distribution, .. } => Ok(distribution),
            Node::Split { .. } => unreachable!("leaf() always returns a leaf"),
        }
    }

    /// Mean decrease in impurity per feature, normalised to sum to 1.0.
    ///
    /// All zeros for a single-leaf tree.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for node in &self.nodes {
            if let Node::Split { feature, impurity_decrease, .. } = node {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Total number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Depth of the deepest leaf; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            match &self.nodes[index] {
                Node::Leaf { .. } => max_depth = max_depth.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), depth + 1));
                    stack.push((right.index(), depth + 1));
                }
            }
        }
        max_depth
    }

    fn leaf(&self, sample: &[f64]) -> Result<&Node, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut node = &self.nodes[0];
        while let Node::Split { feature, threshold, left, right, .. } = node {
            let next = if sample[feature.index()] <= *threshold { left } else { right };
            node = &self.nodes[next.index()];
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[Vec<f64>]) -> FeatureMatrix {
        FeatureMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn pure_labels_give_single_leaf() {
        let x = matrix(&[vec![5.1, 10.0], vec![6.3, 33.0], vec![7.0, 600.0]]);
        let tree = DecisionTreeConfig::new().fit(&x, &[2, 2, 2]).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict(&[6.0, 12.0]).unwrap(), 2);
    }

    #[test]
    fn separable_magnitudes() {
        let x = matrix(&[
            vec![6.5, 10.0],
            vec![6.6, 12.0],
            vec![6.7, 11.0],
            vec![8.0, 10.0],
            vec![8.1, 12.0],
            vec![8.2, 11.0],
        ]);
        let tree = DecisionTreeConfig::new().fit(&x, &[0, 0, 0, 1, 1, 1]).unwrap();
        assert_eq!(tree.predict(&[6.6, 11.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[8.1, 11.0]).unwrap(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn xor_needs_two_levels() {
        let x = matrix(&[vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]]);
        let labels = [0, 1, 1, 0];
        let tree = DecisionTreeConfig::new().fit(&x, &labels).unwrap();
        assert!(tree.depth() >= 2);
        let capped = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&x, &labels)
            .unwrap();
        assert!(capped.depth() <= 1);
    }

    #[test]
    fn distribution_covers_declared_classes() {
        let x = matrix(&[vec![1.0], vec![2.0]]);
        let tree = DecisionTreeConfig::new()
            .fit_with_classes(&x, &[0, 0], 4)
            .unwrap();
        let proba = tree.predict_proba(&[1.5]).unwrap();
        assert_eq!(proba.len(), 4);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn importances_sum_to_one() {
        let x = matrix(&[
            vec![1.0, 100.0],
            vec![2.0, 300.0],
            vec![3.0, 200.0],
            vec![10.0, 100.0],
            vec![11.0, 300.0],
            vec![12.0, 200.0],
        ]);
        let tree = DecisionTreeConfig::new().fit(&x, &[0, 0, 0, 1, 1, 1]).unwrap();
        let sum: f64 = tree.feature_importances().iter().sum();
        assert!((sum - 1.0).abs() < 1e-10, "sum = {sum}");
    }

    #[test]
    fn wrong_width_prediction() {
        let x = matrix(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let tree = DecisionTreeConfig::new().fit(&x, &[0, 1]).unwrap();
        assert!(matches!(
            tree.predict(&[1.0]).unwrap_err(),
            ForestError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn invalid_config_rejected() {
        let x = matrix(&[vec![1.0], vec![2.0]]);
        let labels = [0, 1];
        assert!(matches!(
            DecisionTreeConfig::new().with_max_depth(Some(0)).fit(&x, &labels),
            Err(ForestError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_min_samples_split(1).fit(&x, &labels),
            Err(ForestError::InvalidMinSamplesSplit { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_max_features(Some(2)).fit(&x, &labels),
            Err(ForestError::InvalidMaxFeatures { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().fit(&x, &[0]),
            Err(ForestError::LabelCountMismatch { .. })
        ));
    }

    #[test]
    fn majority_ties_pick_lowest() {
        assert_eq!(majority_class(&[2, 5, 5]), 1);
        assert_eq!(majority_class(&[0, 0]), 0);
    }
}
