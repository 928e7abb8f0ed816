//! Split quality criteria and exact best-split search.

use rand::Rng;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: `1 - Σ p_i²`.
    Gini,
    /// Shannon entropy: `-Σ p_i · ln p_i`.
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node with the given class counts.
    ///
    /// An empty node has zero impurity.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let proportions = class_counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| c as f64 / n);
        let value = match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        };
        Impurity::new(value.max(0.0))
    }
}

/// Best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct BestSplit {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) impurity_decrease: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Search parameters shared by every node of one tree.
pub(crate) struct SplitSearch<'a> {
    /// Column-major features: `columns[feature][sample]`.
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch<'_> {
    /// Find the best threshold split over a random subset of `max_features` features.
    ///
    /// Features are drawn in random order. Features constant on `samples`
    /// do not count towards `max_features`, so drawing continues until that
    /// many non-constant features were evaluated or every feature was drawn.
    /// Candidate thresholds are midpoints between adjacent distinct sorted
    /// values. The split maximising the sample-weighted impurity decrease
    /// wins; the first candidate found wins ties. Returns `None` when every
    /// feature is constant on `samples` or every boundary violates
    /// `min_samples_leaf`.
    pub(crate) fn best_split(
        &self,
        samples: &[usize],
        parent_counts: &[usize],
        parent_impurity: Impurity,
        rng: &mut impl Rng,
    ) -> Option<BestSplit> {
        let n_features = self.columns.len();
        let n_samples = samples.len();
        if n_samples < 2 || n_features == 0 {
            return None;
        }

        let mut order: Vec<usize> = (0..n_features).collect();
        let take = self.max_features.min(n_features);
        let mut evaluated = 0;

        let weighted_parent = n_samples as f64 * parent_impurity.value();
        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n_samples);

        // Lazy Fisher-Yates over feature positions.
        for drawn in 0..n_features {
            if evaluated == take {
                break;
            }
            let j = rng.gen_range(drawn..n_features);
            order.swap(drawn, j);
            let feature = order[drawn];

            let column = &self.columns[feature];
            sorted.clear();
            sorted.extend(samples.iter().map(|&s| (column[s], self.labels[s])));
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
            if sorted[0].0 == sorted[n_samples - 1].0 {
                continue;
            }
            evaluated += 1;

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.to_vec();

            for i in 0..n_samples - 1 {
                let (value, class) = sorted[i];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next = sorted[i + 1].0;
                if value == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n_samples - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let decrease = weighted_parent
                    - n_left as f64 * self.criterion.impurity(&left_counts, n_left).value()
                    - n_right as f64 * self.criterion.impurity(&right_counts, n_right).value();

                if best.is_none_or(|(_, _, d)| decrease > d) {
                    // Adjacent floats can round the midpoint up onto `next`.
                    let mid = (value + next) / 2.0;
                    let threshold = if mid < next { mid } else { value };
                    best = Some((feature, threshold, decrease));
                }
            }
        }

        let (feature, threshold, impurity_decrease) = best?;
        let column = &self.columns[feature];
        let (left, right): (Vec<usize>, Vec<usize>) =
            samples.iter().partition(|&&s| column[s] <= threshold);

        Some(BestSplit {
            feature: FeatureIndex::new(feature),
            threshold,
            impurity_decrease,
            left,
            right,
        })
    }
}
