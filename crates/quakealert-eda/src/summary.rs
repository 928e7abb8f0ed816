//! The exploration summary over one catalogue.

use serde::Serialize;
use tracing::{info, instrument};

use crate::binning::{BinMean, binned_means};
use crate::error::{EdaError, check_paired};
use crate::groups::{GroupMean, GroupSummary, LabelCount, group_means, group_summaries, value_counts};
use crate::histogram::{Histogram, histogram};

/// Columns the summary is computed from, one entry per record.
#[derive(Debug, Clone, Copy)]
pub struct ExploreInput<'a> {
    pub magnitude: &'a [f64],
    pub depth: &'a [f64],
    pub sig: &'a [f64],
    pub alert: &'a [String],
}

/// Settings for [`ExploreConfig::summarize`].
///
/// # Defaults
///
/// | Parameter             | Default |
/// |-----------------------|---------|
/// | `n_bins`              | 30      |
/// | `magnitude_bin_width` | 0.5     |
#[derive(Debug, Clone)]
pub struct ExploreConfig {
    n_bins: usize,
    magnitude_bin_width: f64,
}

/// Distribution summaries of magnitude, depth, significance and alert level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreSummary {
    pub n_records: usize,
    pub magnitude_histogram: Histogram,
    pub depth_histogram: Histogram,
    pub alert_counts: Vec<LabelCount>,
    pub magnitude_by_alert: Vec<GroupSummary>,
    pub sig_by_magnitude_bin: Vec<BinMean>,
    pub sig_by_alert: Vec<GroupMean>,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            n_bins: 30,
            magnitude_bin_width: 0.5,
        }
    }
}

impl ExploreConfig {
    /// Create a config with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the histogram bin count. Checked in [`summarize`](Self::summarize).
    #[must_use]
    pub fn with_n_bins(mut self, n_bins: usize) -> Self {
        self.n_bins = n_bins;
        self
    }

    /// Set the magnitude bin width used for the binned significance means.
    #[must_use]
    pub fn with_magnitude_bin_width(mut self, width: f64) -> Self {
        self.magnitude_bin_width = width;
        self
    }

    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    #[must_use]
    pub fn magnitude_bin_width(&self) -> f64 {
        self.magnitude_bin_width
    }

    /// Compute every summary over `input`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EdaError::ZeroBins`] | `n_bins == 0` |
    /// | [`EdaError::InvalidBinWidth`] | width is not positive and finite |
    /// | [`EdaError::LengthMismatch`] | the columns differ in length |
    /// | [`EdaError::EmptyInput`] | no records |
    /// | [`EdaError::NonFiniteValue`] | a value is NaN or infinite |
    #[instrument(skip_all, fields(n_records = input.alert.len(), n_bins = self.n_bins))]
    pub fn summarize(&self, input: ExploreInput<'_>) -> Result<ExploreSummary, EdaError> {
        let n_records = input.alert.len();
        check_paired("alert", n_records, "magnitude", input.magnitude.len())?;
        check_paired("alert", n_records, "depth", input.depth.len())?;
        check_paired("alert", n_records, "sig", input.sig.len())?;
        if n_records == 0 {
            return Err(EdaError::EmptyInput { what: "alert" });
        }

        let summary = ExploreSummary {
            n_records,
            magnitude_histogram: histogram("magnitude", input.magnitude, self.n_bins)?,
            depth_histogram: histogram("depth", input.depth, self.n_bins)?,
            alert_counts: value_counts(input.alert),
            magnitude_by_alert: group_summaries("magnitude", input.alert, input.magnitude)?,
            sig_by_magnitude_bin: binned_means(
                "magnitude",
                input.magnitude,
                "sig",
                input.sig,
                self.magnitude_bin_width,
            )?,
            sig_by_alert: group_means("sig", input.alert, input.sig)?,
        };
        info!(
            n_alert_levels = summary.alert_counts.len(),
            n_magnitude_bins = summary.sig_by_magnitude_bin.len(),
            "exploration summary computed"
        );
        Ok(summary)
    }
}
