use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use quakealert_eda::{ExploreConfig, ExploreSummary};
use quakealert_forest::{OobMode, RandomForestConfig, SplitCriterion, TrainTestSplit, Voting};
use quakealert_io::{Dataset, EarthquakeReader, ExperimentName, MissingReport, ResultWriter};

/// Bundled catalogue, resolved against the package root rather than the working directory.
const DEFAULT_DATA: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/earthquake_alert_balanced_dataset.csv"
);

#[derive(Parser)]
#[command(name = "quakealert")]
#[command(about = "Earthquake alert-level exploration and random forest classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the train/test shuffle and the forest
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all log output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Hold out a test partition, train a random forest and report its accuracy
    Classify {
        /// Path to the input CSV file
        #[arg(long, default_value = DEFAULT_DATA)]
        data: PathBuf,

        /// Fraction of records held out for testing
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 100)]
        n_trees: usize,

        /// Maximum tree depth (unlimited if not set)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Split criterion: "gini" or "entropy"
        #[arg(long, default_value = "gini")]
        criterion: String,

        /// How trees are combined: "majority" or "soft"
        #[arg(long, default_value = "majority")]
        voting: String,

        /// Also compute out-of-bag accuracy on the training partition
        #[arg(long, default_value_t = false)]
        oob: bool,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long, default_value = "quakealert")]
        experiment: String,

        /// Write a JSON artifact into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Summarize magnitude, depth, significance and alert distributions
    Explore {
        /// Path to the input CSV file
        #[arg(long, default_value = DEFAULT_DATA)]
        data: PathBuf,

        /// Number of histogram bins for magnitude and depth
        #[arg(long, default_value_t = 30)]
        bins: usize,

        /// Width of the magnitude bins used for mean significance
        #[arg(long, default_value_t = 0.5)]
        magnitude_bin_width: f64,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long, default_value = "quakealert")]
        experiment: String,

        /// Write a JSON artifact into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ExploreOutput<'a> {
    experiment: &'a str,
    n_records: usize,
    passthrough_columns: &'a [String],
    summary: &'a ExploreSummary,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        other => anyhow::bail!("unknown criterion: {other} (expected gini or entropy)"),
    }
}

fn parse_voting(s: &str) -> Result<Voting> {
    match s {
        "majority" => Ok(Voting::Majority),
        "soft" => Ok(Voting::Soft),
        other => anyhow::bail!("unknown voting mode: {other} (expected majority or soft)"),
    }
}

/// Read the table, print its missing-value counts and convert it to records.
fn load(data: &Path) -> Result<(MissingReport, Dataset)> {
    let table = EarthquakeReader::new(data)
        .read_table()
        .with_context(|| format!("failed to read {}", data.display()))?;
    let missing = table.missing_counts();
    print!("{missing}");

    let dataset = Dataset::from_table(&table).context("failed to convert rows to records")?;
    info!(
        n_records = dataset.len(),
        passthrough = ?dataset.passthrough_columns(),
        "dataset loaded"
    );
    Ok((missing, dataset))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Classify {
            data,
            test_size,
            n_trees,
            max_depth,
            criterion,
            voting,
            oob,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment)?;
            let oob_mode = if oob { OobMode::Enabled } else { OobMode::Disabled };
            let rf_config = RandomForestConfig::new(n_trees)?
                .with_max_depth(max_depth)
                .with_criterion(parse_criterion(&criterion)?)
                .with_voting(parse_voting(&voting)?)
                .with_oob_mode(oob_mode)
                .with_seed(cli.seed);
            let split = TrainTestSplit::new(test_size)?.with_seed(cli.seed);

            // 1. Load
            let (_, dataset) = load(&data)?;

            // 2. Encode features and target
            let classes = dataset.alert_classes();
            let labels = dataset
                .encoded_labels(&classes)
                .context("failed to encode alert labels")?;
            let features = dataset
                .feature_matrix()
                .context("failed to build feature matrix")?;
            info!(n_classes = classes.len(), classes = ?classes.names(), "target encoded");

            // 3. Split, train, score
            let result = split
                .evaluate(
                    &rf_config,
                    &features,
                    &labels,
                    classes.len(),
                    &dataset.feature_names(),
                    classes.names(),
                )
                .context("hold-out evaluation failed")?;
            if let Some(score) = &result.oob_score {
                info!(oob_accuracy = score.accuracy, n_oob = score.n_oob_samples, "out-of-bag score");
            }

            // 4. Optional artifact
            if let Some(dir) = output_dir {
                let writer = ResultWriter::new(&dir, experiment_name)?;
                writer.write_classify(&result, classes.names(), cli.seed)?;
            }

            // 5. Report
            println!("Accuracy: {:.3}", result.accuracy);
            print!("{}", result.report);
            println!();
            println!("Confusion matrix ({}):", classes.names().join(", "));
            print!("{}", result.confusion_matrix);
        }

        Command::Explore {
            data,
            bins,
            magnitude_bin_width,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment)?;
            let config = ExploreConfig::new()
                .with_n_bins(bins)
                .with_magnitude_bin_width(magnitude_bin_width);

            let (missing, dataset) = load(&data)?;
            let columns = dataset.explore_columns();
            let summary = config
                .summarize(columns.as_input())
                .context("exploration failed")?;

            let output = ExploreOutput {
                experiment: experiment_name.as_str(),
                n_records: dataset.len(),
                passthrough_columns: dataset.passthrough_columns(),
                summary: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);

            if let Some(dir) = output_dir {
                let writer = ResultWriter::new(&dir, experiment_name)?;
                writer.write_explore(&missing, &summary)?;
            }
        }
    }

    Ok(())
}
