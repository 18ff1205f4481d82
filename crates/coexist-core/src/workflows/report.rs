use super::project::{Project, Study};
use super::status;
use crate::core::io::report::{ReportRow, write_report_to_path};
use crate::core::io::traits::TabularRecord;
use crate::core::models::estimates::{BoilingPointSummary, CriticalPointSummary};
use crate::engine::config::PipelineConfig;
use crate::engine::error::AnalysisError;
use std::path::Path;
use tracing::{info, instrument, warn};

fn study_row(study: &Study<'_>, config: &PipelineConfig) -> Result<ReportRow, AnalysisError> {
    let files = &config.files;
    let mut row = ReportRow {
        study: study.key.to_string(),
        ..Default::default()
    };
    if !status::points_summarized(study, files) {
        warn!(study = %study.key, "Study has no point summaries; reporting empty estimates");
        return Ok(row);
    }

    let path = study.path(&files.critical_summary);
    let critical = CriticalPointSummary::read_first_from_path(&path)
        .map_err(|e| AnalysisError::table(path, e))?;
    let path = study.path(&files.boiling_summary);
    let boiling = BoilingPointSummary::read_first_from_path(&path)
        .map_err(|e| AnalysisError::table(path, e))?;

    row.critical_temperature = Some(critical.temperature.mean);
    row.critical_temperature_std = Some(critical.temperature.std_dev);
    row.critical_density = Some(critical.density.mean);
    row.critical_density_std = Some(critical.density.std_dev);
    row.critical_pressure = Some(critical.pressure.mean);
    row.critical_pressure_std = Some(critical.pressure.std_dev);
    row.boiling_temperature = Some(boiling.temperature.mean);
    row.boiling_temperature_std = Some(boiling.temperature.std_dev);
    row.heat_of_vaporization = Some(boiling.heat_of_vaporization.mean);
    row.heat_of_vaporization_std = Some(boiling.heat_of_vaporization.std_dev);
    row.replicates = Some(critical.replicates);
    Ok(row)
}

/// One report row per study, in study order.
pub fn collect_report(
    project: &Project,
    config: &PipelineConfig,
) -> Result<Vec<ReportRow>, AnalysisError> {
    project
        .studies(&config.keys)
        .iter()
        .map(|study| study_row(study, config))
        .collect()
}

/// Writes the cross-study CSV report to `output`.
#[instrument(skip_all, name = "report_workflow")]
pub fn write_project_report(
    project: &Project,
    config: &PipelineConfig,
    output: &Path,
) -> Result<Vec<ReportRow>, AnalysisError> {
    let rows = collect_report(project, config)?;
    write_report_to_path(&rows, output)?;
    info!(rows = rows.len(), output = %output.display(), "Wrote project report");
    Ok(rows)
}
