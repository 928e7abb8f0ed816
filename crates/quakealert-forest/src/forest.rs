//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{MaxFeatures, OobMode, RandomForestConfig, Voting};
use crate::error::ForestError;
use crate::importance::aggregate_importances;
use crate::matrix::FeatureMatrix;
use crate::oob::compute_oob;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// A fitted random forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) voting: Voting,
}

/// Resolve [`MaxFeatures`] against the actual column count.
pub(crate) fn resolve_max_features(
    max_features: MaxFeatures,
    n_features: usize,
) -> Result<usize, ForestError> {
    let n = n_features as f64;
    // Fractional strategies truncate, keeping at least one feature.
    let resolved = match max_features {
        MaxFeatures::Sqrt => (n.sqrt().floor() as usize).max(1),
        MaxFeatures::Log2 => (n.log2().floor() as usize).max(1),
        MaxFeatures::Fraction(f) => ((n * f).floor() as usize).max(1),
        MaxFeatures::Fixed(count) => count,
        MaxFeatures::All => n_features,
    };
    if resolved == 0 || resolved > n_features {
        return Err(ForestError::InvalidMaxFeatures {
            max_features: resolved,
            n_features,
        });
    }
    Ok(resolved)
}

/// Draw `draw_count` indices with replacement; return them and the never-drawn rest.
fn bootstrap_sample(
    n_samples: usize,
    draw_count: usize,
    rng: &mut impl Rng,
) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_samples];
    let drawn: Vec<usize> = (0..draw_count)
        .map(|_| {
            let i = rng.gen_range(0..n_samples);
            in_bag[i] = true;
            i
        })
        .collect();
    let out_of_bag = (0..n_samples).filter(|&i| !in_bag[i]).collect();
    (drawn, out_of_bag)
}

#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.n_samples()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &FeatureMatrix,
    labels: &[usize],
    n_classes: usize,
    feature_names: &[String],
) -> Result<RandomForestResult, ForestError> {
    let n_samples = features.n_samples();
    let n_features = features.n_features();
    if labels.len() != n_samples {
        return Err(ForestError::LabelCountMismatch {
            n_samples,
            n_labels: labels.len(),
        });
    }
    if let Some(&label) = labels.iter().find(|&&l| l >= n_classes) {
        return Err(ForestError::UnknownClass { label, n_classes });
    }
    let max_features = resolve_max_features(config.max_features, n_features)?;
    // Each bootstrap draws as many rows as the training set holds.
    let draw_count = n_samples;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features,
        draw_count,
        "training random forest"
    );

    let tree_config = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));

    // Per-tree seeds come from one master stream so the result does not
    // depend on how rayon schedules the trees.
    let mut master = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master.r#gen()).collect();

    let fitted: Vec<(DecisionTree, Vec<usize>)> = tree_seeds
        .into_par_iter()
        .map(|seed| -> Result<(DecisionTree, Vec<usize>), ForestError> {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (drawn, out_of_bag) = bootstrap_sample(n_samples, draw_count, &mut rng);
            let bag_features = features.select(&drawn);
            let bag_labels: Vec<usize> = drawn.iter().map(|&i| labels[i]).collect();
            let tree = tree_config
                .clone()
                .with_seed(rng.r#gen())
                .fit_with_classes(&bag_features, &bag_labels, n_classes)?;
            Ok((tree, out_of_bag))
        })
        .collect::<Result<_, ForestError>>()?;

    let (trees, oob_indices_per_tree): (Vec<DecisionTree>, Vec<Vec<usize>>) =
        fitted.into_iter().unzip();
    debug!(n_trees_trained = trees.len(), "tree training complete");

    let per_tree: Vec<Vec<f64>> = trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree, feature_names);

    let oob_score = match config.oob_mode {
        OobMode::Enabled => Some(compute_oob(
            &trees,
            features,
            labels,
            n_classes,
            &oob_indices_per_tree,
        )?),
        OobMode::Disabled => None,
    };

    info!(
        oob_accuracy = oob_score.as_ref().map(|s| s.accuracy),
        "random forest training complete"
    );

    let forest = RandomForest {
        trees,
        n_features,
        n_classes,
        voting: config.voting,
    };
    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_classes,
        n_samples,
        max_features_resolved: max_features,
    };

    Ok(RandomForestResult::new(forest, importances, oob_score, metadata))
}
