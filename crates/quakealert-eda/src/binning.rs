//! Means of one column over fixed-width bins of another.

use serde::Serialize;

use crate::error::{EdaError, check_paired, check_values};
use crate::histogram::min_max;

/// Mean of the binned values whose key falls in `(lower, upper]`.
///
/// `mean` is `None` for a bin no key falls into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinMean {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub mean: Option<f64>,
}

/// Average `values` over bins of `keys` that are `width` wide.
///
/// Edges start at the smallest key and step by `width` until the largest key
/// is covered, so there are `ceil((max - min) / width)` bins, at least one.
/// Every bin is open on the left, so keys equal to the smallest key lie
/// outside all bins and contribute to no mean.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EdaError::InvalidBinWidth`] | `width` is not a positive finite number |
/// | [`EdaError::LengthMismatch`] | `keys` and `values` differ in length |
/// | [`EdaError::EmptyInput`] | no keys |
/// | [`EdaError::NonFiniteValue`] | a key or value is NaN or infinite |
pub fn binned_means(
    key_name: &'static str,
    keys: &[f64],
    value_name: &'static str,
    values: &[f64],
    width: f64,
) -> Result<Vec<BinMean>, EdaError> {
    if !(width.is_finite() && width > 0.0) {
        return Err(EdaError::InvalidBinWidth { width });
    }
    check_paired(key_name, keys.len(), value_name, values.len())?;
    check_values(key_name, keys)?;
    check_values(value_name, values)?;

    let (lo, hi) = min_max(keys);
    let n_bins = ((hi - lo) / width).ceil().max(1.0) as usize;
    let edges: Vec<f64> = (0..=n_bins).map(|i| lo + width * i as f64).collect();

    let mut sums = vec![0.0; n_bins];
    let mut counts = vec![0usize; n_bins];
    for (&key, &value) in keys.iter().zip(values) {
        if key <= lo {
            continue;
        }
        // First upper edge at or above the key; keys past the last edge by
        // rounding stay in the last bin.
        let bin = edges[1..].partition_point(|&e| e < key).min(n_bins - 1);
        sums[bin] += value;
        counts[bin] += 1;
    }

    Ok(edges
        .windows(2)
        .zip(sums.into_iter().zip(counts))
        .map(|(edge, (sum, count))| BinMean {
            lower: edge[0],
            upper: edge[1],
            count,
            mean: (count > 0).then(|| sum / count as f64),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_closed_bins_from_minimum() {
        let keys = [6.5, 6.9, 7.0, 7.1, 8.0];
        let values = [100.0, 200.0, 300.0, 1000.0, 2000.0];
        let bins = binned_means("magnitude", &keys, "sig", &values, 0.5).unwrap();
        // (6.5, 7.0] | (7.0, 7.5] | (7.5, 8.0]
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].lower, 6.5);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].mean, Some(250.0));
        assert_eq!(bins[1].mean, Some(1000.0));
        assert_eq!(bins[2].mean, Some(2000.0));
        assert_eq!(bins[2].upper, 8.0);
    }

    #[test]
    fn empty_bins_have_no_mean() {
        let bins = binned_means("magnitude", &[6.5, 8.0], "sig", &[1.0, 3.0], 0.5).unwrap();
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[1].count, 0);
        assert_eq!(bins[1].mean, None);
    }

    #[test]
    fn constant_keys_make_one_empty_bin() {
        let bins = binned_means("magnitude", &[7.0, 7.0], "sig", &[2.0, 4.0], 0.5).unwrap();
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].lower, 7.0);
        assert_eq!(bins[0].upper, 7.5);
        assert_eq!(bins[0].count, 0);
        assert_eq!(bins[0].mean, None);
    }

    #[test]
    fn keys_at_the_minimum_are_left_out() {
        let keys = [6.5, 6.5, 6.7, 7.2];
        let values = [9000.0, 9000.0, 600.0, 800.0];
        let bins = binned_means("magnitude", &keys, "sig", &values, 0.5).unwrap();
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(bins[0].mean, Some(600.0));
        assert_eq!(bins[1].mean, Some(800.0));
    }

    #[test]
    fn every_key_above_the_minimum_is_counted() {
        let keys: Vec<f64> = (0..40).map(|i| 6.5 + i as f64 * 0.07).collect();
        let values = vec![1.0; keys.len()];
        let bins = binned_means("magnitude", &keys, "sig", &values, 0.5).unwrap();
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 39);
        assert!(bins.last().unwrap().upper >= keys[39]);
    }

    #[test]
    fn width_must_be_positive() {
        for width in [0.0, -0.5, f64::NAN] {
            assert!(matches!(
                binned_means("magnitude", &[1.0], "sig", &[1.0], width),
                Err(EdaError::InvalidBinWidth { .. })
            ));
        }
    }
}
