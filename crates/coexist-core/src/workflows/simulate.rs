use super::project::Job;
use super::status;
use crate::engine::config::{FileLayout, SimulationConfig};
use crate::engine::error::AnalysisError;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStage {
    Equilibration,
    Production,
}

impl SimulationStage {
    pub fn control_name(self, files: &FileLayout) -> &str {
        match self {
            SimulationStage::Equilibration => &files.equilibration_control,
            SimulationStage::Production => &files.production_control,
        }
    }
}

impl fmt::Display for SimulationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationStage::Equilibration => f.write_str("equilibration"),
            SimulationStage::Production => f.write_str("production"),
        }
    }
}

/// A fully resolved invocation of the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// File receiving the engine's standard output.
    pub stdout_path: PathBuf,
}

impl SimulationCommand {
    /// The command without its output redirection, for callers that attach
    /// their own stdio.
    pub fn to_std_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.working_dir);
        command
    }
}

impl fmt::Display for SimulationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, " > {}", self.stdout_path.display())
    }
}

/// Outcome of preparing a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    Run(SimulationCommand),
    /// The stage's console and merged structure files exist; the run was
    /// started before.
    AlreadyStarted,
}

pub fn engine_binary(config: &SimulationConfig) -> PathBuf {
    let device = if config.ngpu > 0 { "GPU" } else { "CPU" };
    config
        .binary_dir
        .join(format!("GOMC_{device}_{}", config.ensemble))
}

/// Checks the stage's preconditions and resolves the command that runs it.
pub fn prepare(
    job: &Job,
    stage: SimulationStage,
    files: &FileLayout,
    config: &SimulationConfig,
) -> Result<LaunchPlan, AnalysisError> {
    let control = stage.control_name(files);
    let precondition = |reason: &str| AnalysisError::Precondition {
        stage: format!("{stage} of job {}", job.id),
        reason: reason.to_string(),
    };

    if status::simulation_started(job, control) {
        return Ok(LaunchPlan::AlreadyStarted);
    }
    if !status::control_file_written(job, control) {
        return Err(precondition("control file has not been written"));
    }
    match stage {
        SimulationStage::Equilibration => {
            if !status::input_files_written(job, files) {
                return Err(precondition("input structures are missing"));
            }
        }
        SimulationStage::Production => {
            if !status::simulation_completed(job, &files.equilibration_control) {
                return Err(precondition("equilibration has not completed"));
            }
        }
    }

    Ok(LaunchPlan::Run(SimulationCommand {
        program: engine_binary(config),
        args: vec![
            format!("+p{}", config.ncpu),
            FileLayout::control_file(control),
        ],
        working_dir: job.dir.clone(),
        stdout_path: job.path(FileLayout::console_file(control)),
    }))
}
