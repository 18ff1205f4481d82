use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// One line of the cross-study CSV report. Empty cells stand for estimates
/// that have not been produced for the study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub study: String,
    #[serde(rename = "Tc_K")]
    pub critical_temperature: Option<f64>,
    #[serde(rename = "Tc_std_K")]
    pub critical_temperature_std: Option<f64>,
    #[serde(rename = "Rho_c_kg_per_m_cubed")]
    pub critical_density: Option<f64>,
    #[serde(rename = "Rho_c_std_kg_per_m_cubed")]
    pub critical_density_std: Option<f64>,
    #[serde(rename = "Pc_bar")]
    pub critical_pressure: Option<f64>,
    #[serde(rename = "Pc_std_bar")]
    pub critical_pressure_std: Option<f64>,
    #[serde(rename = "Tbp_K")]
    pub boiling_temperature: Option<f64>,
    #[serde(rename = "Tbp_std_K")]
    pub boiling_temperature_std: Option<f64>,
    #[serde(rename = "Hv_kJ_per_mol_Claus_Clap")]
    pub heat_of_vaporization: Option<f64>,
    #[serde(rename = "Hv_std_kJ_per_mol_Claus_Clap")]
    pub heat_of_vaporization_std: Option<f64>,
    #[serde(rename = "No_replicates")]
    pub replicates: Option<usize>,
}

pub fn write_report(rows: &[ReportRow], writer: impl Write) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_report_to_path(rows: &[ReportRow], path: &Path) -> Result<(), ReportError> {
    let file = std::fs::File::create(path).map_err(|e| ReportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    write_report(rows, std::io::BufWriter::new(file)).map_err(|e| ReportError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

pub fn read_report_from_path(path: &Path) -> Result<Vec<ReportRow>, ReportError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ReportError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<ReportRow>() {
        rows.push(result.map_err(|e| ReportError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?);
    }
    Ok(rows)
}
