use super::config::AnalysisConfig;
use crate::core::io::blk::BlockAverages;
use crate::core::io::table::TableError;
use crate::core::models::observable::Observable;
use crate::core::models::properties::BoxProperties;
use crate::core::models::records::{BoxRecord, ReplicateSummary};
use tracing::{debug, warn};

/// Averages the two boxes of one replicate over the configured step window
/// and labels them by density.
///
/// The denser box is the liquid. When the densities tie, or cannot be
/// compared because one of them is NaN, box 0 is taken as the liquid.
pub fn reduce_replicate(
    boxes: [BlockAverages; 2],
    temperature: f64,
    config: &AnalysisConfig,
) -> Result<ReplicateSummary, TableError> {
    let [mut box0, mut box1] = boxes;
    let window = config.step_window;
    box0.restrict_steps(window.start, window.finish);
    box1.restrict_steps(window.start, window.finish);

    let species = if config.species.is_empty() {
        box0.species()
    } else {
        config.species.clone()
    };

    let first = average_box(&box0, &species, temperature)?;
    let second = average_box(&box1, &species, temperature)?;
    debug!(
        rows_box0 = box0.len(),
        rows_box1 = box1.len(),
        density_box0 = first.properties.density,
        density_box1 = second.properties.density,
        "Averaged replicate boxes"
    );

    let (d0, d1) = (first.properties.density, second.properties.density);
    if d0 == d1 || d0.is_nan() || d1.is_nan() {
        warn!(
            temperature,
            density_box0 = d0,
            density_box1 = d1,
            "Box densities do not order; labelling box 0 as liquid"
        );
    }

    let summary = if d0 < d1 {
        ReplicateSummary {
            liquid: second,
            vapor: first,
        }
    } else {
        ReplicateSummary {
            liquid: first,
            vapor: second,
        }
    };
    Ok(summary)
}

fn average_box(
    blk: &BlockAverages,
    species: &[String],
    temperature: f64,
) -> Result<BoxRecord, TableError> {
    let volume = blk.column_mean("VOLUME")?;
    let properties = BoxProperties::try_from_fn(species, |obs| match obs.block_column() {
        Some(column) => blk.column_mean(&column),
        None => {
            debug_assert_eq!(*obs, Observable::BoxLength);
            Ok(volume.cbrt())
        }
    })?;
    Ok(BoxRecord {
        temperature,
        properties,
    })
}
