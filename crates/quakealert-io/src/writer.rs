//! JSON artifacts for classification and exploration runs.

use std::fs;
use std::path::{Path, PathBuf};

use quakealert_eda::ExploreSummary;
use quakealert_forest::{
    ClassificationReport, HoldoutResult, OobScore, RankedFeature, TrainingMetadata,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;
use crate::table::MissingReport;

/// Writes run results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_classify.json` and
/// `{experiment}_explore.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a hold-out evaluation to `{experiment}_classify.json`.
    ///
    /// `class_names[c]` names class index `c` in the confusion matrix.
    /// Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_classify(
        &self,
        result: &HoldoutResult,
        class_names: &[String],
        seed: u64,
    ) -> Result<PathBuf, IoError> {
        let artifact = ClassifyArtifact {
            experiment: self.experiment.as_str(),
            seed,
            n_train: result.n_train,
            n_test: result.n_test,
            accuracy: result.accuracy,
            classes: class_names,
            confusion_matrix: result.confusion_matrix.as_rows(),
            report: &result.report,
            feature_importances: &result.feature_importances,
            oob: result.oob_score.as_ref(),
            training: &result.metadata,
        };
        let path = self.artifact_path("classify");
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "classification result written");
        Ok(path)
    }

    /// Write an exploration summary to `{experiment}_explore.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_explore(
        &self,
        missing: &MissingReport,
        summary: &ExploreSummary,
    ) -> Result<PathBuf, IoError> {
        let artifact = ExploreArtifact {
            experiment: self.experiment.as_str(),
            missing: &missing.columns,
            summary,
        };
        let path = self.artifact_path("explore");
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "exploration summary written");
        Ok(path)
    }

    fn artifact_path(&self, kind: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()))
    }

    fn write_json(&self, path: &Path, artifact: &impl Serialize) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct ClassifyArtifact<'a> {
    experiment: &'a str,
    seed: u64,
    n_train: usize,
    n_test: usize,
    accuracy: f64,
    classes: &'a [String],
    confusion_matrix: &'a [Vec<usize>],
    report: &'a ClassificationReport,
    feature_importances: &'a [RankedFeature],
    oob: Option<&'a OobScore>,
    training: &'a TrainingMetadata,
}

#[derive(Serialize)]
struct ExploreArtifact<'a> {
    experiment: &'a str,
    missing: &'a [crate::table::MissingCount],
    summary: &'a ExploreSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakealert_eda::{ExploreConfig, ExploreInput};
    use quakealert_forest::{FeatureMatrix, RandomForestConfig, TrainTestSplit};
    use tempfile::TempDir;

    use crate::table::MissingCount;

    fn writer(dir: &TempDir, name: &str) -> ResultWriter {
        ResultWriter::new(dir.path(), ExperimentName::new(name.to_string()).unwrap()).unwrap()
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("runs").join("today");
        ResultWriter::new(&nested, ExperimentName::new("x".into()).unwrap()).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn classify_json_structure() {
        let rows: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![6.5 + (i % 2) as f64, 700.0 + (i % 2) as f64 * 500.0])
            .collect();
        let labels: Vec<usize> = (0..20).map(|i| i % 2).collect();
        let x = FeatureMatrix::from_rows(&rows).unwrap();
        let features = vec!["magnitude".to_string(), "sig".to_string()];
        let classes = vec!["green".to_string(), "red".to_string()];
        let result = TrainTestSplit::new(0.2)
            .unwrap()
            .evaluate(&RandomForestConfig::new(5).unwrap(), &x, &labels, 2, &features, &classes)
            .unwrap();

        let dir = TempDir::new().unwrap();
        let path = writer(&dir, "unit").write_classify(&result, &classes, 42).unwrap();
        assert_eq!(path, dir.path().join("unit_classify.json"));

        let content = read_json(&path);
        assert_eq!(content["experiment"], "unit");
        assert_eq!(content["seed"], 42);
        assert_eq!(content["n_test"], 4);
        assert_eq!(content["n_train"], 16);
        assert!(content["accuracy"].is_number());
        assert_eq!(content["classes"].as_array().unwrap().len(), 2);
        assert_eq!(content["confusion_matrix"].as_array().unwrap().len(), 2);
        assert!(content["report"]["rows"].is_array());
        assert!(content["report"]["weighted_avg"]["f1"].is_number());
        assert_eq!(content["feature_importances"].as_array().unwrap().len(), 2);
        assert!(content["oob"].is_null());
        assert_eq!(content["training"]["n_trees"], 5);
    }

    #[test]
    fn explore_json_structure() {
        let alert = vec!["green".to_string(), "red".to_string(), "green".to_string()];
        let summary = ExploreConfig::new()
            .with_n_bins(3)
            .summarize(ExploreInput {
                magnitude: &[6.5, 8.0, 6.9],
                depth: &[10.0, 20.0, 15.0],
                sig: &[650.0, 1500.0, 700.0],
                alert: &alert,
            })
            .unwrap();
        let missing = MissingReport {
            columns: vec![MissingCount {
                column: "magnitude".to_string(),
                missing: 0,
            }],
        };

        let dir = TempDir::new().unwrap();
        let path = writer(&dir, "eda").write_explore(&missing, &summary).unwrap();
        let content = read_json(&path);
        assert_eq!(content["experiment"], "eda");
        assert_eq!(content["missing"][0]["column"], "magnitude");
        assert_eq!(content["summary"]["n_records"], 3);
        assert_eq!(content["summary"]["magnitude_histogram"]["counts"].as_array().unwrap().len(), 3);
        assert_eq!(content["summary"]["alert_counts"][0]["label"], "green");
        assert!(content["summary"]["magnitude_by_alert"][0]["median"].is_number());
        let bins = content["summary"]["sig_by_magnitude_bin"].as_array().unwrap();
        assert!(bins.iter().any(|b| b["mean"].is_null()));
    }
}
