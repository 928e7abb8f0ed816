/// Errors from descriptive statistics.
#[derive(Debug, thiserror::Error)]
pub enum EdaError {
    /// Returned when a statistic is requested over zero values.
    #[error("{what} is empty")]
    EmptyInput {
        /// Name of the empty input.
        what: &'static str,
    },

    /// Returned when paired slices differ in length.
    #[error("{left} has {left_len} values but {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    /// Returned when a histogram is requested with zero bins.
    #[error("histogram needs at least one bin")]
    ZeroBins,

    /// Returned when a fixed bin width is zero, negative or not finite.
    #[error("bin width must be a positive finite number, got {width}")]
    InvalidBinWidth {
        /// The rejected width.
        width: f64,
    },

    /// Returned when an input holds NaN or an infinity.
    #[error("{what}[{index}] is not finite: {value}")]
    NonFiniteValue {
        what: &'static str,
        index: usize,
        value: f64,
    },
}

pub(crate) fn check_values(what: &'static str, values: &[f64]) -> Result<(), EdaError> {
    if values.is_empty() {
        return Err(EdaError::EmptyInput { what });
    }
    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(EdaError::NonFiniteValue { what, index, value });
    }
    Ok(())
}

pub(crate) fn check_paired(
    left: &'static str,
    left_len: usize,
    right: &'static str,
    right_len: usize,
) -> Result<(), EdaError> {
    if left_len != right_len {
        return Err(EdaError::LengthMismatch {
            left,
            left_len,
            right,
            right_len,
        });
    }
    Ok(())
}
