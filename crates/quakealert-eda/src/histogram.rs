//! Equal-width histograms.

use serde::Serialize;
use tracing::debug;

use crate::error::{EdaError, check_values};

/// Bin edges and counts; `counts[i]` covers `[edges[i], edges[i + 1])`,
/// except the last bin, which also holds its upper edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Count `values` into `n_bins` equal-width bins spanning `[min, max]`.
///
/// A constant input has no span, so the range is widened to
/// `[value - 0.5, value + 0.5]`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EdaError::ZeroBins`] | `n_bins == 0` |
/// | [`EdaError::EmptyInput`] | `values` is empty |
/// | [`EdaError::NonFiniteValue`] | a value is NaN or infinite |
pub fn histogram(what: &'static str, values: &[f64], n_bins: usize) -> Result<Histogram, EdaError> {
    if n_bins == 0 {
        return Err(EdaError::ZeroBins);
    }
    check_values(what, values)?;

    let (mut lo, mut hi) = min_max(values);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let span = hi - lo;
    let edges: Vec<f64> = (0..=n_bins)
        .map(|i| lo + span * i as f64 / n_bins as f64)
        .collect();

    let mut counts = vec![0usize; n_bins];
    for &v in values {
        let mut bin = (((v - lo) / span) * n_bins as f64) as usize;
        bin = bin.min(n_bins - 1);
        // Rounding in the scaled index can land one bin off the edges.
        if bin > 0 && v < edges[bin] {
            bin -= 1;
        } else if bin + 1 < n_bins && v >= edges[bin + 1] {
            bin += 1;
        }
        counts[bin] += 1;
    }
    debug!(what, n_bins, lo, hi, "histogram computed");
    Ok(Histogram { edges, counts })
}

/// Smallest and largest value of a non-empty, finite slice.
pub(crate) fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
