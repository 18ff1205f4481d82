/// Mean and Bessel-corrected sample standard deviation of a set of values.
///
/// `std_dev` is NaN when fewer than two values contribute; callers are
/// expected to check [`SampleStats::is_degenerate`] rather than relying on
/// the NaN alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl SampleStats {
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        let mean = mean(values);
        let std_dev = if count < 2 {
            f64::NAN
        } else {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        };
        Self {
            mean,
            std_dev,
            count,
        }
    }

    /// True when the standard deviation is undefined (fewer than two values).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.count < 2
    }
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Arithmetic mean over the non-NaN entries; NaN when none remain.
pub fn nan_mean<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
