//! Accuracy regression tests for quakealert-forest.
//!
//! A deterministic synthetic catalogue stands in for the alert dataset so
//! that algorithmic changes which degrade the classifier are caught.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use quakealert_forest::{
    ClassificationReport, ConfusionMatrix, FeatureMatrix, OobMode, RandomForestConfig,
    SplitCriterion, TrainTestSplit, Voting,
};

const FEATURES: [&str; 5] = ["magnitude", "depth", "cdi", "mmi", "sig"];
const ALERTS: [&str; 4] = ["green", "orange", "red", "yellow"];

// ---------------------------------------------------------------------------
// Helper: synthetic earthquake catalogue
// ---------------------------------------------------------------------------

/// 400 balanced records over four alert levels.
///
/// `cdi`, `mmi` and `sig` rise with the class index; `magnitude` and
/// `depth` are noise. Classes are assigned round-robin.
fn make_catalogue() -> (FeatureMatrix, Vec<usize>, Vec<String>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let rows: Vec<Vec<f64>> = (0..400)
        .map(|i| {
            let class = (i % 4) as f64;
            vec![
                6.5 + rng.r#gen::<f64>() * 1.5,
                rng.r#gen::<f64>() * 120.0,
                class * 2.0 + rng.r#gen::<f64>() * 1.5,
                class * 1.8 + rng.r#gen::<f64>() * 1.2,
                650.0 + class * 300.0 + rng.r#gen::<f64>() * 200.0,
            ]
        })
        .collect();
    let labels = (0..400).map(|i| i % 4).collect();
    let features = FEATURES.iter().map(|s| s.to_string()).collect();
    let classes = ALERTS.iter().map(|s| s.to_string()).collect();
    (FeatureMatrix::from_rows(&rows).unwrap(), labels, features, classes)
}

// ---------------------------------------------------------------------------
// a) holdout_accuracy_above_threshold
// ---------------------------------------------------------------------------

#[test]
fn holdout_accuracy_above_threshold() {
    let (x, y, features, classes) = make_catalogue();
    let config = RandomForestConfig::new(100).unwrap().with_seed(42);
    let result = TrainTestSplit::new(0.2)
        .unwrap()
        .with_seed(42)
        .evaluate(&config, &x, &y, 4, &features, &classes)
        .unwrap();

    assert_eq!(result.n_test, 80);
    assert_eq!(result.n_train, 320);
    assert!(result.accuracy > 0.9, "hold-out accuracy {} <= 0.9", result.accuracy);
}

// ---------------------------------------------------------------------------
// b) report_is_consistent_with_confusion
// ---------------------------------------------------------------------------

#[test]
fn report_is_consistent_with_confusion() {
    let (x, y, features, classes) = make_catalogue();
    let config = RandomForestConfig::new(50).unwrap();
    let result = TrainTestSplit::new(0.2)
        .unwrap()
        .evaluate(&config, &x, &y, 4, &features, &classes)
        .unwrap();

    let report = &result.report;
    assert_eq!(report.rows.iter().map(|r| r.support).sum::<usize>(), result.n_test);
    assert!((report.accuracy - result.accuracy).abs() < 1e-12);
    let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
    let mut sorted = labels.clone();
    sorted.sort_unstable();
    assert_eq!(labels, sorted);

    let rebuilt = ClassificationReport::from_confusion(&result.confusion_matrix, &classes).unwrap();
    assert_eq!(&rebuilt, report);
}

// ---------------------------------------------------------------------------
// c) oob_accuracy_above_threshold
// ---------------------------------------------------------------------------

#[test]
fn oob_accuracy_above_threshold() {
    let (x, y, features, _) = make_catalogue();
    let result = RandomForestConfig::new(100)
        .unwrap()
        .with_oob_mode(OobMode::Enabled)
        .fit(&x, &y, 4, &features)
        .unwrap();

    let oob = result.oob_score().expect("OOB score must be computed when OobMode::Enabled");
    assert!(oob.accuracy > 0.85, "oob_accuracy {} <= 0.85", oob.accuracy);
}

// ---------------------------------------------------------------------------
// d) top_features_are_informative
// ---------------------------------------------------------------------------

#[test]
fn top_features_are_informative() {
    let (x, y, features, _) = make_catalogue();
    let result = RandomForestConfig::new(100).unwrap().fit(&x, &y, 4, &features).unwrap();

    let top2: Vec<&str> = result.importances().iter().take(2).map(|f| f.name.as_str()).collect();
    for name in &top2 {
        assert!(
            ["cdi", "mmi", "sig"].contains(name),
            "noise feature ranked in the top two: {top2:?}"
        );
    }
    let total: f64 = result.importances().iter().map(|f| f.importance).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// e) deterministic_across_thread_counts
// ---------------------------------------------------------------------------

#[test]
fn deterministic_across_thread_counts() {
    let (x, y, features, classes) = make_catalogue();
    let config = RandomForestConfig::new(30).unwrap().with_seed(42);
    let split = TrainTestSplit::new(0.2).unwrap().with_seed(42);

    let run = |threads: usize| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| split.evaluate(&config, &x, &y, 4, &features, &classes).unwrap())
    };
    let one = run(1);
    let four = run(4);
    assert_eq!(one.predictions, four.predictions);
    assert_eq!(one.test_indices, four.test_indices);
    assert_eq!(one.report, four.report);
}

// ---------------------------------------------------------------------------
// f) entropy_and_soft_voting_also_learn
// ---------------------------------------------------------------------------

#[test]
fn entropy_and_soft_voting_also_learn() {
    let (x, y, features, classes) = make_catalogue();
    let config = RandomForestConfig::new(50)
        .unwrap()
        .with_criterion(SplitCriterion::Entropy)
        .with_voting(Voting::Soft)
        .with_max_depth(Some(8));
    let result = TrainTestSplit::new(0.2)
        .unwrap()
        .evaluate(&config, &x, &y, 4, &features, &classes)
        .unwrap();
    assert!(result.accuracy > 0.85, "accuracy {} <= 0.85", result.accuracy);
}

// ---------------------------------------------------------------------------
// g) training_accuracy
// ---------------------------------------------------------------------------

#[test]
fn training_accuracy() {
    let (x, y, features, _) = make_catalogue();
    let result = RandomForestConfig::new(100).unwrap().fit(&x, &y, 4, &features).unwrap();
    let predictions = result.forest().predict_batch(&x).unwrap();
    let cm = ConfusionMatrix::from_labels(&y, &predictions, 4).unwrap();
    assert!(cm.accuracy() > 0.97, "training accuracy {} <= 0.97", cm.accuracy());
}
