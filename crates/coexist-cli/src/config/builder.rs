use super::defaults::{DefaultsConfig, PROJECT_CONFIG_FILE};
use super::file::{FileConfig, FileLayoutConfig};
use crate::cli::{AnalysisOverrides, GlobalArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use coexist::engine::config::{FileLayout, PipelineConfig, PipelineConfigBuilder, StatePointKeys};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a command contributes to its configuration.
pub struct ConfigSources<'a> {
    pub project_dir: &'a Path,
    pub config_path: Option<&'a Path>,
    pub set_values: &'a [String],
    pub overrides: &'a AnalysisOverrides,
}

impl<'a> ConfigSources<'a> {
    pub fn new(global: &'a GlobalArgs, overrides: &'a AnalysisOverrides) -> Self {
        Self {
            project_dir: &global.project_dir,
            config_path: global.config.as_deref(),
            set_values: &global.set_values,
            overrides,
        }
    }
}

fn locate_config_file(sources: &ConfigSources<'_>) -> Option<PathBuf> {
    if let Some(path) = sources.config_path {
        return Some(path.to_path_buf());
    }
    let candidate = sources.project_dir.join(PROJECT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Merges, highest priority first: command-line flags, `--set` values, the
/// configuration file, and the built-in defaults.
pub fn build_config(sources: &ConfigSources<'_>) -> Result<PipelineConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = match locate_config_file(sources) {
        Some(path) => FileConfig::from_file(&path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, sources.set_values)?;
    let cli = sources.overrides;

    let analysis = file_config.analysis.take().unwrap_or_default();
    let critical = file_config.critical.take().unwrap_or_default();
    let boiling = file_config.boiling.take().unwrap_or_default();
    let simulation = file_config.simulation.take().unwrap_or_default();
    let keys = file_config.keys.take().unwrap_or_default();
    let files = file_config.files.take().unwrap_or_default();

    let species = if cli.species.is_empty() {
        analysis.species.unwrap_or_default()
    } else {
        cli.species.clone()
    };
    let strict_replicates = cli.strict_replicates
        || analysis
            .strict_replicates
            .unwrap_or(defaults.strict_replicates);

    let mut builder = PipelineConfigBuilder::new()
        .species(species)
        .beta(cli.beta.or(critical.beta).unwrap_or(defaults.beta))
        .min_reduced_temperature(
            cli.min_reduced_temperature
                .or(critical.min_reduced_temperature)
                .unwrap_or(defaults.min_reduced_temperature),
        )
        .standard_pressure_bar(
            boiling
                .standard_pressure_bar
                .unwrap_or(defaults.standard_pressure_bar),
        )
        .gas_constant(boiling.gas_constant.unwrap_or(defaults.gas_constant))
        .strict_replicates(strict_replicates)
        .keys(StatePointKeys {
            temperature: keys.temperature.unwrap_or(defaults.temperature_key),
            replica: keys.replica.unwrap_or(defaults.replica_key),
        })
        .files(merge_file_layout(files))
        .binary_dir(simulation.binary_dir.unwrap_or(defaults.binary_dir))
        .ncpu(simulation.ncpu.unwrap_or(defaults.ncpu))
        .ngpu(simulation.ngpu.unwrap_or(defaults.ngpu))
        .ensemble(simulation.ensemble.unwrap_or(defaults.ensemble));

    if let Some(step) = cli.step_start.or(analysis.step_start) {
        builder = builder.step_start(step);
    }
    if let Some(step) = cli.step_finish.or(analysis.step_finish) {
        builder = builder.step_finish(step);
    }

    let config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    debug!("Resolved pipeline configuration: {:?}", config);
    Ok(config)
}

fn merge_file_layout(file: FileLayoutConfig) -> FileLayout {
    let mut layout = FileLayout::default();
    let overrides = [
        (file.workspace_dir, &mut layout.workspace_dir),
        (file.analysis_dir, &mut layout.analysis_dir),
        (file.force_field, &mut layout.force_field),
        (file.box_structure, &mut layout.box_structure),
        (file.equilibration_control, &mut layout.equilibration_control),
        (file.production_control, &mut layout.production_control),
    ];
    for (value, slot) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
    layout
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    let invalid = |e: parser::ParseError| CliError::Config(e.to_string());

    for kv_pair in set_values {
        let (key, value) = parser::parse_key_value(kv_pair).map_err(invalid)?;
        let float = |v: &str| parser::parse_value::<f64>(key, v, "float").map_err(invalid);
        let integer = |v: &str| parser::parse_value::<u64>(key, v, "integer").map_err(invalid);
        let count = |v: &str| parser::parse_value::<usize>(key, v, "integer").map_err(invalid);
        let boolean = |v: &str| parser::parse_value::<bool>(key, v, "boolean").map_err(invalid);

        match key {
            "analysis.step-start" => {
                config.analysis.get_or_insert_with(Default::default).step_start =
                    Some(integer(value)?);
            }
            "analysis.step-finish" => {
                config.analysis.get_or_insert_with(Default::default).step_finish =
                    Some(integer(value)?);
            }
            "analysis.species" => {
                config.analysis.get_or_insert_with(Default::default).species =
                    Some(parser::parse_list(value));
            }
            "analysis.strict-replicates" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .strict_replicates = Some(boolean(value)?);
            }
            "critical.beta" => {
                config.critical.get_or_insert_with(Default::default).beta = Some(float(value)?);
            }
            "critical.min-reduced-temperature" => {
                config
                    .critical
                    .get_or_insert_with(Default::default)
                    .min_reduced_temperature = Some(float(value)?);
            }
            "boiling.standard-pressure-bar" => {
                config
                    .boiling
                    .get_or_insert_with(Default::default)
                    .standard_pressure_bar = Some(float(value)?);
            }
            "boiling.gas-constant" => {
                config.boiling.get_or_insert_with(Default::default).gas_constant =
                    Some(float(value)?);
            }
            "simulation.binary-dir" => {
                config.simulation.get_or_insert_with(Default::default).binary_dir =
                    Some(PathBuf::from(value));
            }
            "simulation.ncpu" => {
                config.simulation.get_or_insert_with(Default::default).ncpu = Some(count(value)?);
            }
            "simulation.ngpu" => {
                config.simulation.get_or_insert_with(Default::default).ngpu = Some(count(value)?);
            }
            "simulation.ensemble" => {
                config.simulation.get_or_insert_with(Default::default).ensemble =
                    Some(value.to_string());
            }
            "keys.temperature" => {
                config.keys.get_or_insert_with(Default::default).temperature =
                    Some(value.to_string());
            }
            "keys.replica" => {
                config.keys.get_or_insert_with(Default::default).replica = Some(value.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
