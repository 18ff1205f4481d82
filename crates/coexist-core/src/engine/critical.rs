use super::config::CriticalFitConfig;
use super::error::AnalysisError;
use crate::core::models::estimates::{CriticalPoint, TemperatureWindow};
use crate::core::models::records::BoxRecord;
use crate::core::stats::LinearFit;
use tracing::{debug, instrument};

const TEMPERATURE_TOLERANCE: f64 = 1e-9;

/// Liquid and vapor state of one temperature along a coexistence curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoexistencePoint {
    pub temperature: f64,
    pub liquid_density: f64,
    pub vapor_density: f64,
    pub vapor_pressure: f64,
}

/// Coexistence points of one replicate group, ascending by temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSeries {
    points: Vec<CoexistencePoint>,
}

impl TemperatureSeries {
    pub fn from_points(mut points: Vec<CoexistencePoint>) -> Self {
        points.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
        Self { points }
    }

    /// Pairs liquid and vapor records position by position.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::TemperatureMismatch`] when the two lists do
    /// not carry the same temperatures in the same order.
    pub fn from_records(liquid: &[BoxRecord], vapor: &[BoxRecord]) -> Result<Self, AnalysisError> {
        if liquid.len() != vapor.len() {
            let index = liquid.len().min(vapor.len());
            return Err(AnalysisError::TemperatureMismatch {
                index,
                liquid: liquid.get(index).map_or(f64::NAN, |r| r.temperature),
                vapor: vapor.get(index).map_or(f64::NAN, |r| r.temperature),
            });
        }

        let points = liquid
            .iter()
            .zip(vapor)
            .enumerate()
            .map(|(index, (l, v))| {
                if (l.temperature - v.temperature).abs() > TEMPERATURE_TOLERANCE {
                    return Err(AnalysisError::TemperatureMismatch {
                        index,
                        liquid: l.temperature,
                        vapor: v.temperature,
                    });
                }
                Ok(CoexistencePoint {
                    temperature: l.temperature,
                    liquid_density: l.properties.density,
                    vapor_density: v.properties.density,
                    vapor_pressure: v.properties.pressure,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_points(points))
    }

    pub fn points(&self) -> &[CoexistencePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.temperature).collect()
    }

    /// The `size` highest-temperature points.
    pub fn highest(&self, size: usize) -> &[CoexistencePoint] {
        &self.points[self.points.len().saturating_sub(size)..]
    }
}

/// Clausius-Clapeyron fit of `ln P` against `1/T`.
pub(crate) fn vapor_pressure_fit(points: &[CoexistencePoint]) -> Result<LinearFit, AnalysisError> {
    let inverse_t: Vec<f64> = points.iter().map(|p| 1.0 / p.temperature).collect();
    let ln_p: Vec<f64> = points.iter().map(|p| p.vapor_pressure.ln()).collect();
    Ok(LinearFit::fit(&inverse_t, &ln_p)?)
}

/// Extrapolates the critical point of a coexistence curve.
///
/// Windows of the `w` highest temperatures are tried from the whole series
/// down to two points. In each, the order parameter
/// `(rho_l - rho_v)^(1/beta)` is fitted linearly in `T` and its root is `Tc`;
/// the rectilinear diameter `(rho_l + rho_v) / 2` evaluated at `Tc` gives
/// `rho_c`; the vapor-pressure fit evaluated at `1/Tc` gives `Pc`. The
/// largest window whose lowest temperature is at least
/// `min_reduced_temperature * Tc` is returned.
#[instrument(skip_all, name = "critical_point", fields(points = series.len()))]
pub fn estimate_critical_point(
    series: &TemperatureSeries,
    config: &CriticalFitConfig,
) -> Result<CriticalPoint, AnalysisError> {
    let n = series.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientPoints {
            estimate: "critical point",
            required: 2,
            found: n,
        });
    }

    for size in (2..=n).rev() {
        let window = series.highest(size);
        match fit_window(window, config) {
            Some(point) => {
                debug!(
                    size,
                    tc = point.temperature,
                    reduced = point.window.lowest_reduced,
                    "Accepted critical-point window"
                );
                return Ok(point);
            }
            None => debug!(size, "Rejected critical-point window"),
        }
    }

    Err(AnalysisError::NoAcceptedWindow {
        points: n,
        threshold: config.min_reduced_temperature,
    })
}

fn fit_window(window: &[CoexistencePoint], config: &CriticalFitConfig) -> Option<CriticalPoint> {
    let temperatures: Vec<f64> = window.iter().map(|p| p.temperature).collect();
    let diameter: Vec<f64> = window
        .iter()
        .map(|p| 0.5 * (p.liquid_density + p.vapor_density))
        .collect();
    let order_parameter: Vec<f64> = window
        .iter()
        .map(|p| (p.liquid_density - p.vapor_density).powf(1.0 / config.beta))
        .collect();

    let diameter_fit = LinearFit::fit(&temperatures, &diameter).ok()?;
    let order_fit = LinearFit::fit(&temperatures, &order_parameter).ok()?;
    if !diameter_fit.is_finite() || !order_fit.is_finite() {
        return None;
    }

    let tc = order_fit.root();
    if !tc.is_finite() || tc <= 0.0 {
        return None;
    }

    let lowest = temperatures[0];
    let highest = temperatures[temperatures.len() - 1];
    if lowest / tc < config.min_reduced_temperature {
        return None;
    }

    // A failed pressure fit leaves Pc undefined but does not reject the window.
    let pc = vapor_pressure_fit(window)
        .map(|fit| fit.evaluate(1.0 / tc).exp())
        .unwrap_or(f64::NAN);

    Some(CriticalPoint {
        temperature: tc,
        density: diameter_fit.evaluate(tc),
        pressure: pc,
        window: TemperatureWindow {
            lowest,
            highest,
            lowest_reduced: lowest / tc,
            highest_reduced: highest / tc,
            count: window.len(),
        },
    })
}
