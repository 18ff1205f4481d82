use super::config::BoilingFitConfig;
use super::critical::{TemperatureSeries, vapor_pressure_fit};
use super::error::AnalysisError;
use crate::core::models::estimates::{BoilingPoint, TemperatureWindow};
use tracing::{debug, instrument};

/// Solves the Clausius-Clapeyron fit of the whole series for the temperature
/// at which the vapor pressure equals the standard pressure.
///
/// `ln P = a + b / T` gives `Tbp = b / (ln P_std - a)` and
/// `dHv = -b * R`. Reduced bounds are taken against `critical_temperature`.
#[instrument(skip_all, name = "boiling_point", fields(points = series.len()))]
pub fn estimate_boiling_point(
    series: &TemperatureSeries,
    critical_temperature: f64,
    config: &BoilingFitConfig,
) -> Result<BoilingPoint, AnalysisError> {
    let n = series.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientPoints {
            estimate: "boiling point",
            required: 2,
            found: n,
        });
    }

    let fit = vapor_pressure_fit(series.points())?;
    let inverse_tbp = fit.solve_for(config.standard_pressure_bar.ln());
    let temperature = 1.0 / inverse_tbp;
    let heat_of_vaporization = -fit.slope * config.gas_constant;
    debug!(
        tbp = temperature,
        slope = fit.slope,
        intercept = fit.intercept,
        r = fit.r_value,
        "Fitted vapor-pressure curve"
    );

    let temperatures = series.temperatures();
    let lowest = temperatures[0];
    let highest = temperatures[n - 1];
    Ok(BoilingPoint {
        temperature,
        pressure: config.standard_pressure_bar,
        heat_of_vaporization,
        window: TemperatureWindow {
            lowest,
            highest,
            lowest_reduced: lowest / critical_temperature,
            highest_reduced: highest / critical_temperature,
            count: n,
        },
    })
}
