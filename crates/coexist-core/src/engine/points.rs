use super::error::AnalysisError;
use crate::core::models::estimates::{
    BoilingPoint, BoilingPointSummary, CriticalPoint, CriticalPointSummary, TemperatureWindow,
};
use crate::core::stats::{SampleStats, mean};
use tracing::warn;

const ABSOLUTE_TOLERANCE: f64 = 1e-9;

fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > ABSOLUTE_TOLERANCE
}

/// Checks that every estimate was regressed over the same temperatures and
/// returns the shared window.
///
/// Reduced bounds are not compared, since each replicate reduces by its own
/// critical temperature; the returned window carries their mean.
fn common_window(
    estimate: &'static str,
    windows: &[TemperatureWindow],
) -> Result<TemperatureWindow, AnalysisError> {
    let first = windows.first().ok_or(AnalysisError::NoEstimates(estimate))?;
    for (index, window) in windows.iter().enumerate().skip(1) {
        let detail = if differs(window.lowest, first.lowest) {
            Some(format!(
                "lowest temperature {} K vs {} K at row {index}",
                first.lowest, window.lowest
            ))
        } else if differs(window.highest, first.highest) {
            Some(format!(
                "highest temperature {} K vs {} K at row {index}",
                first.highest, window.highest
            ))
        } else if window.count != first.count {
            Some(format!(
                "{} vs {} temperatures at row {index}",
                first.count, window.count
            ))
        } else {
            None
        };
        if let Some(detail) = detail {
            return Err(AnalysisError::WindowMismatch { estimate, detail });
        }
    }

    let lowest_reduced: Vec<f64> = windows.iter().map(|w| w.lowest_reduced).collect();
    let highest_reduced: Vec<f64> = windows.iter().map(|w| w.highest_reduced).collect();
    Ok(TemperatureWindow {
        lowest_reduced: mean(&lowest_reduced),
        highest_reduced: mean(&highest_reduced),
        ..*first
    })
}

fn stats_of<T>(items: &[T], value: impl Fn(&T) -> f64) -> SampleStats {
    let values: Vec<f64> = items.iter().map(value).collect();
    SampleStats::from_values(&values)
}

/// Mean and sample standard deviation of per-replicate critical points.
pub fn summarize_critical_points(
    points: &[CriticalPoint],
) -> Result<CriticalPointSummary, AnalysisError> {
    let windows: Vec<TemperatureWindow> = points.iter().map(|p| p.window).collect();
    let window = common_window("critical point", &windows)?;
    if points.len() < 2 {
        warn!("Critical point summary from a single replicate; standard deviations are undefined");
    }
    Ok(CriticalPointSummary {
        temperature: stats_of(points, |p| p.temperature),
        density: stats_of(points, |p| p.density),
        pressure: stats_of(points, |p| p.pressure),
        window,
        replicates: points.len(),
    })
}

/// Mean and sample standard deviation of per-replicate boiling points.
pub fn summarize_boiling_points(
    points: &[BoilingPoint],
) -> Result<BoilingPointSummary, AnalysisError> {
    let windows: Vec<TemperatureWindow> = points.iter().map(|p| p.window).collect();
    let window = common_window("boiling point", &windows)?;
    let pressure = points[0].pressure;
    if let Some(p) = points.iter().find(|p| differs(p.pressure, pressure)) {
        return Err(AnalysisError::WindowMismatch {
            estimate: "boiling point",
            detail: format!("solved for {pressure} bar and {} bar", p.pressure),
        });
    }
    if points.len() < 2 {
        warn!("Boiling point summary from a single replicate; standard deviations are undefined");
    }
    Ok(BoilingPointSummary {
        temperature: stats_of(points, |p| p.temperature),
        pressure,
        heat_of_vaporization: stats_of(points, |p| p.heat_of_vaporization),
        window,
        replicates: points.len(),
    })
}
