//! Per-label counts, means and five-number summaries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{EdaError, check_paired, check_values};

/// Number of records carrying one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Mean of a numeric column within one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub label: String,
    pub count: usize,
    pub mean: f64,
}

/// Box-plot statistics; quartiles use linear interpolation between order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// A [`FiveNumberSummary`] for the values under one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub count: usize,
    #[serde(flatten)]
    pub summary: FiveNumberSummary,
}

/// Count each distinct label, most frequent first; equal counts sort by label.
pub fn value_counts<S: AsRef<str>>(labels: &[S]) -> Vec<LabelCount> {
    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *tally.entry(label.as_ref()).or_default() += 1;
    }
    let mut counts: Vec<LabelCount> = tally
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the BTreeMap's label order within equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Mean of `values` per label, sorted by label.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EdaError::LengthMismatch`] | `labels` and `values` differ in length |
/// | [`EdaError::EmptyInput`] | no values |
/// | [`EdaError::NonFiniteValue`] | a value is NaN or infinite |
pub fn group_means<S: AsRef<str>>(
    what: &'static str,
    labels: &[S],
    values: &[f64],
) -> Result<Vec<GroupMean>, EdaError> {
    Ok(grouped(what, labels, values)?
        .into_iter()
        .map(|(label, group)| GroupMean {
            label: label.to_string(),
            count: group.len(),
            mean: group.iter().sum::<f64>() / group.len() as f64,
        })
        .collect())
}

/// Five-number summary of `values` per label, sorted by label.
///
/// # Errors
///
/// Same conditions as [`group_means`].
pub fn group_summaries<S: AsRef<str>>(
    what: &'static str,
    labels: &[S],
    values: &[f64],
) -> Result<Vec<GroupSummary>, EdaError> {
    Ok(grouped(what, labels, values)?
        .into_iter()
        .map(|(label, mut group)| {
            group.sort_by(f64::total_cmp);
            GroupSummary {
                label: label.to_string(),
                count: group.len(),
                summary: FiveNumberSummary::from_sorted(&group),
            }
        })
        .collect())
}

impl FiveNumberSummary {
    /// Summarize `values`.
    ///
    /// # Errors
    ///
    /// Returns [`EdaError::EmptyInput`] or [`EdaError::NonFiniteValue`].
    pub fn new(what: &'static str, values: &[f64]) -> Result<Self, EdaError> {
        check_values(what, values)?;
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Ok(Self::from_sorted(&sorted))
    }

    fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            min: sorted[0],
            q1: quantile_sorted(sorted, 0.25),
            median: quantile_sorted(sorted, 0.5),
            q3: quantile_sorted(sorted, 0.75),
            max: sorted[sorted.len() - 1],
        }
    }
}

/// `q`-quantile of an ascending, non-empty slice, interpolating linearly
/// between the neighbouring order statistics at position `q * (n - 1)`.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn grouped<'a, S: AsRef<str>>(
    what: &'static str,
    labels: &'a [S],
    values: &[f64],
) -> Result<BTreeMap<&'a str, Vec<f64>>, EdaError> {
    check_paired("labels", labels.len(), what, values.len())?;
    check_values(what, values)?;
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (label, &v) in labels.iter().zip(values) {
        groups.entry(label.as_ref()).or_default().push(v);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sorted_by_frequency_then_label() {
        let labels = ["green", "red", "yellow", "red", "orange", "yellow"];
        let counts = value_counts(&labels);
        let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(
            pairs,
            vec![("red", 2), ("yellow", 2), ("green", 1), ("orange", 1)]
        );
    }

    #[test]
    fn means_per_label() {
        let labels = ["red", "green", "red", "green"];
        let means = group_means("sig", &labels, &[900.0, 600.0, 1100.0, 700.0]).unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].label, "green");
        assert_eq!(means[0].mean, 650.0);
        assert_eq!(means[1].label, "red");
        assert_eq!(means[1].mean, 1000.0);
        assert_eq!(means[1].count, 2);
    }

    #[test]
    fn quantiles_interpolate() {
        let s = FiveNumberSummary::new("magnitude", &[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q3, 3.25);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn single_value_summary_is_flat() {
        let s = FiveNumberSummary::new("magnitude", &[7.2]).unwrap();
        assert_eq!([s.min, s.q1, s.median, s.q3, s.max], [7.2; 5]);
    }

    #[test]
    fn summaries_per_label() {
        let labels = ["green", "green", "green", "red"];
        let summaries = group_summaries("magnitude", &labels, &[6.5, 7.5, 7.0, 8.0]).unwrap();
        assert_eq!(summaries[0].label, "green");
        assert_eq!(summaries[0].summary.median, 7.0);
        assert_eq!(summaries[1].count, 1);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        assert!(matches!(
            group_means("sig", &["green"], &[1.0, 2.0]),
            Err(EdaError::LengthMismatch { left_len: 1, right_len: 2, .. })
        ));
    }
}
