use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAnalysisConfig {
    pub step_start: Option<u64>,
    pub step_finish: Option<u64>,
    pub species: Option<Vec<String>>,
    pub strict_replicates: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileCriticalConfig {
    pub beta: Option<f64>,
    pub min_reduced_temperature: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileBoilingConfig {
    pub standard_pressure_bar: Option<f64>,
    pub gas_constant: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSimulationConfig {
    pub binary_dir: Option<PathBuf>,
    pub ncpu: Option<usize>,
    pub ngpu: Option<usize>,
    pub ensemble: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileKeysConfig {
    pub temperature: Option<String>,
    pub replica: Option<String>,
}

/// Overrides of the project's file names.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileLayoutConfig {
    pub workspace_dir: Option<String>,
    pub analysis_dir: Option<String>,
    pub force_field: Option<String>,
    pub box_structure: Option<String>,
    pub equilibration_control: Option<String>,
    pub production_control: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub analysis: Option<FileAnalysisConfig>,
    pub critical: Option<FileCriticalConfig>,
    pub boiling: Option<FileBoilingConfig>,
    pub simulation: Option<FileSimulationConfig>,
    pub keys: Option<FileKeysConfig>,
    pub files: Option<FileLayoutConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
