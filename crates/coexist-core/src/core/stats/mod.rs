//! Descriptive statistics and least-squares fitting used by the analysis stages.

pub mod regression;
pub mod summary;

pub use regression::{LinearFit, RegressionError};
pub use summary::{SampleStats, mean, nan_mean};
