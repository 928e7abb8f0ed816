//! Random forest classification for earthquake alert levels.
//!
//! CART decision trees with Gini or entropy splits, bootstrap-aggregated
//! into a forest trained in parallel with rayon. A seeded hold-out split,
//! confusion matrix and per-class classification report cover evaluation;
//! impurity importances and out-of-bag accuracy come with every fit.

mod config;
mod confusion;
mod criterion;
mod error;
mod forest;
mod holdout;
mod importance;
mod matrix;
mod node;
mod oob;
mod predict;
mod report;
mod result;
mod tree;

pub use config::{MaxFeatures, OobMode, RandomForestConfig, Voting};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use criterion::SplitCriterion;
pub use error::ForestError;
pub use forest::RandomForest;
pub use holdout::{HoldoutResult, SplitIndices, TrainTestSplit};
pub use importance::RankedFeature;
pub use matrix::FeatureMatrix;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use oob::OobScore;
pub use predict::ClassDistribution;
pub use report::{AverageRow, ClassificationReport, ReportRow};
pub use result::{RandomForestResult, TrainingMetadata};
pub use tree::{DecisionTree, DecisionTreeConfig};
