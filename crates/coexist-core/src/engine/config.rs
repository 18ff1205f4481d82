use crate::core::models::records::Phase;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Inclusive range of simulation steps used for averaging; open ends are
/// unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepWindow {
    pub start: Option<u64>,
    pub finish: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalFitConfig {
    /// Critical exponent of the order-parameter scaling law.
    pub beta: f64,
    /// Smallest accepted `T_lowest / Tc` of a regression window.
    pub min_reduced_temperature: f64,
}

impl Default for CriticalFitConfig {
    fn default() -> Self {
        Self {
            beta: 0.325,
            min_reduced_temperature: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoilingFitConfig {
    pub standard_pressure_bar: f64,
    /// Gas constant in kJ/(mol K).
    pub gas_constant: f64,
}

impl Default for BoilingFitConfig {
    fn default() -> Self {
        Self {
            standard_pressure_bar: 1.01325,
            gas_constant: 0.008134,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub step_window: StepWindow,
    /// Species whose mole fractions are reported. Empty means every
    /// `MOLFRACT_` column found in the block-average files.
    pub species: Vec<String>,
    pub critical: CriticalFitConfig,
    pub boiling: BoilingFitConfig,
    /// Treat a state point with fewer than two replicates as an error
    /// instead of a warning.
    pub strict_replicates: bool,
}

/// Names of every file read or written by the workflows.
#[derive(Debug, Clone, PartialEq)]
pub struct FileLayout {
    pub workspace_dir: String,
    pub analysis_dir: String,
    pub statepoint_file: String,
    pub force_field: String,
    pub box_structure: String,
    pub equilibration_control: String,
    pub production_control: String,
    pub replicate_summary_stem: String,
    pub aggregate_stem: String,
    pub critical_points: String,
    pub critical_summary: String,
    pub boiling_points: String,
    pub boiling_summary: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            workspace_dir: "workspace".into(),
            analysis_dir: "analysis".into(),
            statepoint_file: "statepoint.toml".into(),
            force_field: "in_gomc_FF".into(),
            box_structure: "mosdef_box_0".into(),
            equilibration_control: "gomc_equilb_design_ensemble".into(),
            production_control: "gomc_production_run".into(),
            replicate_summary_stem: "analysis_avg_data_box".into(),
            aggregate_stem: "analysis_avg_std_of_replicates_box".into(),
            critical_points: "analysis_critical_points_all_replicates.txt".into(),
            critical_summary: "analysis_critical_points_avg_std_of_replicates.txt".into(),
            boiling_points: "analysis_boiling_point_all_replicates.txt".into(),
            boiling_summary: "analysis_boiling_point_avg_std_of_replicates.txt".into(),
        }
    }
}

impl FileLayout {
    /// Block-average output of the production run for box `index`.
    pub fn block_averages(&self, index: usize) -> String {
        format!("Blk_{}_BOX_{index}.dat", self.production_control)
    }

    pub fn replicate_summary(&self, phase: Phase) -> String {
        format!("{}_{}.txt", self.replicate_summary_stem, phase.tag())
    }

    pub fn aggregate(&self, phase: Phase) -> String {
        format!("{}_{}.txt", self.aggregate_stem, phase.tag())
    }

    pub fn force_field_file(&self) -> String {
        format!("{}.inp", self.force_field)
    }

    pub fn box_structure_files(&self) -> [String; 2] {
        [
            format!("{}.psf", self.box_structure),
            format!("{}.pdb", self.box_structure),
        ]
    }

    pub fn control_file(name: &str) -> String {
        format!("{name}.conf")
    }

    pub fn console_file(name: &str) -> String {
        format!("out_{name}.dat")
    }

    pub fn merged_structure_file(name: &str) -> String {
        format!("{name}_merged.psf")
    }

    /// Study-level outputs derived from the aggregate tables.
    pub fn point_files(&self) -> [&str; 4] {
        [
            &self.critical_points,
            &self.critical_summary,
            &self.boiling_points,
            &self.boiling_summary,
        ]
    }
}

/// State-point parameters with a special meaning to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePointKeys {
    pub temperature: String,
    pub replica: String,
}

impl Default for StatePointKeys {
    fn default() -> Self {
        Self {
            temperature: "production_temperature_K".into(),
            replica: "replica_number_int".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub binary_dir: PathBuf,
    pub ncpu: usize,
    pub ngpu: usize,
    pub ensemble: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            binary_dir: PathBuf::from("."),
            ncpu: 1,
            ngpu: 0,
            ensemble: "GEMC".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub analysis: AnalysisConfig,
    pub files: FileLayout,
    pub keys: StatePointKeys,
    pub simulation: SimulationConfig,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    step_start: Option<u64>,
    step_finish: Option<u64>,
    species: Option<Vec<String>>,
    beta: Option<f64>,
    min_reduced_temperature: Option<f64>,
    standard_pressure_bar: Option<f64>,
    gas_constant: Option<f64>,
    strict_replicates: Option<bool>,
    files: Option<FileLayout>,
    keys: Option<StatePointKeys>,
    binary_dir: Option<PathBuf>,
    ncpu: Option<usize>,
    ngpu: Option<usize>,
    ensemble: Option<String>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_start(mut self, step: u64) -> Self {
        self.step_start = Some(step);
        self
    }
    pub fn step_finish(mut self, step: u64) -> Self {
        self.step_finish = Some(step);
        self
    }
    pub fn species(mut self, species: Vec<String>) -> Self {
        self.species = Some(species);
        self
    }
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }
    pub fn min_reduced_temperature(mut self, threshold: f64) -> Self {
        self.min_reduced_temperature = Some(threshold);
        self
    }
    pub fn standard_pressure_bar(mut self, pressure: f64) -> Self {
        self.standard_pressure_bar = Some(pressure);
        self
    }
    pub fn gas_constant(mut self, r: f64) -> Self {
        self.gas_constant = Some(r);
        self
    }
    pub fn strict_replicates(mut self, strict: bool) -> Self {
        self.strict_replicates = Some(strict);
        self
    }
    pub fn files(mut self, files: FileLayout) -> Self {
        self.files = Some(files);
        self
    }
    pub fn keys(mut self, keys: StatePointKeys) -> Self {
        self.keys = Some(keys);
        self
    }
    pub fn binary_dir(mut self, dir: PathBuf) -> Self {
        self.binary_dir = Some(dir);
        self
    }
    pub fn ncpu(mut self, n: usize) -> Self {
        self.ncpu = Some(n);
        self
    }
    pub fn ngpu(mut self, n: usize) -> Self {
        self.ngpu = Some(n);
        self
    }
    pub fn ensemble(mut self, ensemble: String) -> Self {
        self.ensemble = Some(ensemble);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let defaults = PipelineConfig::default();

        let step_window = StepWindow {
            start: self.step_start,
            finish: self.step_finish,
        };
        if let (Some(start), Some(finish)) = (step_window.start, step_window.finish) {
            if start > finish {
                return Err(invalid(
                    "step_window",
                    format!("start {start} is after finish {finish}"),
                ));
            }
        }

        let species = self.species.unwrap_or_default();
        if let Some(bad) = species
            .iter()
            .find(|s| s.is_empty() || s.chars().any(char::is_whitespace))
        {
            return Err(invalid("species", format!("'{bad}' is not a valid species name")));
        }

        let critical = CriticalFitConfig {
            beta: positive("beta", self.beta.unwrap_or(defaults.analysis.critical.beta))?,
            min_reduced_temperature: self
                .min_reduced_temperature
                .unwrap_or(defaults.analysis.critical.min_reduced_temperature),
        };
        if !(critical.min_reduced_temperature > 0.0 && critical.min_reduced_temperature <= 1.0) {
            return Err(invalid(
                "min_reduced_temperature",
                format!("{} is outside (0, 1]", critical.min_reduced_temperature),
            ));
        }

        let boiling = BoilingFitConfig {
            standard_pressure_bar: positive(
                "standard_pressure_bar",
                self.standard_pressure_bar
                    .unwrap_or(defaults.analysis.boiling.standard_pressure_bar),
            )?,
            gas_constant: positive(
                "gas_constant",
                self.gas_constant
                    .unwrap_or(defaults.analysis.boiling.gas_constant),
            )?,
        };

        let simulation = SimulationConfig {
            binary_dir: self.binary_dir.unwrap_or(defaults.simulation.binary_dir),
            ncpu: self.ncpu.unwrap_or(defaults.simulation.ncpu),
            ngpu: self.ngpu.unwrap_or(defaults.simulation.ngpu),
            ensemble: self.ensemble.unwrap_or(defaults.simulation.ensemble),
        };
        if simulation.ncpu == 0 {
            return Err(invalid("ncpu", "at least one CPU core is required".into()));
        }
        if simulation.ensemble.trim().is_empty() {
            return Err(invalid("ensemble", "must not be empty".into()));
        }

        let keys = self.keys.unwrap_or(defaults.keys);
        if keys.temperature == keys.replica {
            return Err(invalid(
                "keys",
                "temperature and replica keys must differ".into(),
            ));
        }

        Ok(PipelineConfig {
            analysis: AnalysisConfig {
                step_window,
                species,
                critical,
                boiling,
                strict_replicates: self.strict_replicates.unwrap_or(false),
            },
            files: self.files.unwrap_or(defaults.files),
            keys,
            simulation,
        })
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { name, reason }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(name, format!("{value} must be a positive finite number")))
    }
}
