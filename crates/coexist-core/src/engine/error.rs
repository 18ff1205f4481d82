use super::config::ConfigError;
use crate::core::io::report::ReportError;
use crate::core::io::table::TableError;
use crate::core::stats::RegressionError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("'{0}' has no workspace directory; run `init` first")]
    MissingWorkspace(PathBuf),

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid state point in '{path}': {source}")]
    StatePoint {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize state point for job '{job}': {source}")]
    Serialize {
        job: String,
        source: toml::ser::Error,
    },

    #[error("Job '{job}' has no numeric parameter '{key}'")]
    MissingParameter { job: String, key: String },

    #[error("Invalid study definition '{path}': {reason}")]
    Study { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Table error in '{path}': {source}")]
    Table { path: PathBuf, source: TableError },

    #[error(
        "Liquid and vapor temperatures are misaligned at position {index}: {liquid} K vs {vapor} K"
    )]
    TemperatureMismatch {
        index: usize,
        liquid: f64,
        vapor: f64,
    },

    #[error("{estimate} estimates disagree on the temperature window ({detail})")]
    WindowMismatch {
        estimate: &'static str,
        detail: String,
    },

    #[error(
        "No regression window of {points} points reaches a reduced temperature of {threshold}"
    )]
    NoAcceptedWindow { points: usize, threshold: f64 },

    #[error("Need at least {required} temperatures for {estimate}, got {found}")]
    InsufficientPoints {
        estimate: &'static str,
        required: usize,
        found: usize,
    },

    #[error("Regression failed: {source}")]
    Regression {
        #[from]
        source: RegressionError,
    },

    #[error("State point {group} has {found} replicate(s); at least 2 are required")]
    InsufficientReplicates { group: String, found: usize },

    #[error("No {0} estimates to aggregate")]
    NoEstimates(&'static str),

    #[error("Replicates of {group} report different species")]
    InconsistentSpecies { group: String },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Project error: {source}")]
    Project {
        #[from]
        source: ProjectError,
    },

    #[error("Report error: {source}")]
    Report {
        #[from]
        source: ReportError,
    },

    #[error("Precondition not met for {stage}: {reason}")]
    Precondition { stage: String, reason: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn table(path: impl Into<PathBuf>, source: TableError) -> Self {
        Self::Table {
            path: path.into(),
            source,
        }
    }
}
