use nalgebra::DVector;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegressionError {
    #[error("Regression needs at least 2 points, got {found}")]
    TooFewPoints { found: usize },
    #[error("Abscissa and ordinate lengths differ ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },
    #[error("All abscissa values are identical; slope is undefined")]
    DegenerateAbscissa,
}

/// Ordinary least-squares fit of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient of the fitted data.
    pub r_value: f64,
}

impl LinearFit {
    /// Fits a straight line through `(x[i], y[i])`.
    ///
    /// Non-finite samples are not rejected; they propagate into the
    /// coefficients as NaN, which callers treat as a failed fit.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, RegressionError> {
        if x.len() != y.len() {
            return Err(RegressionError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(RegressionError::TooFewPoints { found: x.len() });
        }

        let xs = DVector::from_column_slice(x);
        let ys = DVector::from_column_slice(y);
        let x_mean = xs.mean();
        let y_mean = ys.mean();
        let dx = xs.add_scalar(-x_mean);
        let dy = ys.add_scalar(-y_mean);

        let sxx = dx.dot(&dx);
        if sxx == 0.0 {
            return Err(RegressionError::DegenerateAbscissa);
        }
        let sxy = dx.dot(&dy);
        let syy = dy.dot(&dy);

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;
        let r_value = if syy == 0.0 {
            0.0
        } else {
            sxy / (sxx * syy).sqrt()
        };

        Ok(Self {
            slope,
            intercept,
            r_value,
        })
    }

    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Abscissa where the fitted line crosses zero.
    #[inline]
    pub fn root(&self) -> f64 {
        -self.intercept / self.slope
    }

    /// Abscissa where the fitted line takes the value `y`.
    #[inline]
    pub fn solve_for(&self, y: f64) -> f64 {
        (y - self.intercept) / self.slope
    }

    pub fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}
