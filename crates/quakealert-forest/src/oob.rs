//! Out-of-bag evaluation.

use crate::error::ForestError;
use crate::matrix::FeatureMatrix;
use crate::tree::{DecisionTree, majority_class};

/// Out-of-bag evaluation result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OobScore {
    /// Fraction of OOB-evaluated samples predicted correctly.
    pub accuracy: f64,
    /// `confusion_matrix[true][predicted]` over OOB-evaluated samples.
    pub confusion_matrix: Vec<Vec<usize>>,
    /// Samples left out of at least one tree's bootstrap.
    pub n_oob_samples: usize,
}

/// Majority-vote each sample using only the trees that never saw it.
///
/// Samples that were in every bootstrap are skipped.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    features: &FeatureMatrix,
    labels: &[usize],
    n_classes: usize,
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, ForestError> {
    let mut votes = vec![vec![0usize; n_classes]; features.n_samples()];
    for (tree, oob) in trees.iter().zip(oob_indices_per_tree) {
        for &i in oob {
            votes[i][tree.predict(features.row(i))?] += 1;
        }
    }

    let mut confusion_matrix = vec![vec![0usize; n_classes]; n_classes];
    let mut n_oob_samples = 0usize;
    let mut correct = 0usize;
    for (sample_votes, &label) in votes.iter().zip(labels) {
        if sample_votes.iter().all(|&v| v == 0) {
            continue;
        }
        let predicted = majority_class(sample_votes);
        confusion_matrix[label][predicted] += 1;
        n_oob_samples += 1;
        if predicted == label {
            correct += 1;
        }
    }

    if n_oob_samples == 0 {
        return Err(ForestError::OobEvaluationFailed {
            reason: "no sample was left out of any bootstrap".to_string(),
        });
    }

    Ok(OobScore {
        accuracy: correct as f64 / n_oob_samples as f64,
        confusion_matrix,
        n_oob_samples,
    })
}
