//! Descriptive statistics for an earthquake alert catalogue.
//!
//! Histograms, per-alert counts, means and box-plot summaries, and binned
//! means of significance over magnitude. Everything works on plain slices;
//! loading and rendering happen elsewhere.

mod binning;
mod error;
mod groups;
mod histogram;
mod summary;

pub use binning::{BinMean, binned_means};
pub use error::EdaError;
pub use groups::{
    FiveNumberSummary, GroupMean, GroupSummary, LabelCount, group_means, group_summaries,
    value_counts,
};
pub use histogram::{Histogram, histogram};
pub use summary::{ExploreConfig, ExploreInput, ExploreSummary};
