use super::open_project;
use crate::cli::{AnalysisOverrides, GlobalArgs, RunArgs, RunStage};
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use coexist::engine::progress::{Progress, ProgressReporter};
use coexist::workflows::project::{Job, Project};
use coexist::workflows::simulate::{self, LaunchPlan, SimulationCommand, SimulationStage};
use std::process::Stdio;
use tokio::sync::mpsc;
use tracing::{info, warn};

impl From<RunStage> for SimulationStage {
    fn from(stage: RunStage) -> Self {
        match stage {
            RunStage::Equilibration => SimulationStage::Equilibration,
            RunStage::Production => SimulationStage::Production,
        }
    }
}

/// The requested jobs in project order, or every job when none is named.
fn select_jobs<'a>(project: &'a Project, ids: &[String]) -> Result<Vec<&'a Job>> {
    if ids.is_empty() {
        return Ok(project.jobs().iter().collect());
    }
    if let Some(unknown) = ids.iter().find(|id| project.job(id).is_none()) {
        return Err(CliError::Argument(format!("no job with id '{}'", unknown)));
    }
    Ok(project
        .jobs()
        .iter()
        .filter(|job| ids.contains(&job.id))
        .collect())
}

/// Runs the engine with its output captured in the stage's console file.
///
/// The console file is removed again when the engine cannot be spawned or
/// exits with a failure, so the job is not mistaken for a started run.
async fn execute(job: &Job, command: &SimulationCommand) -> Result<()> {
    info!("Running '{}' in {:?}", command, command.working_dir);
    let stdout = std::fs::File::create(&command.stdout_path)?;
    let outcome = tokio::process::Command::from(command.to_std_command())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::inherit())
        .status()
        .await;

    let result = match outcome {
        Ok(status) if status.success() => return Ok(()),
        Ok(status) => Err(CliError::Simulation {
            job: job.id.clone(),
            status,
        }),
        Err(e) => Err(CliError::Io(e)),
    };
    if let Err(e) = std::fs::remove_file(&command.stdout_path) {
        warn!(
            "Could not remove console file {:?} of failed job '{}': {}",
            command.stdout_path, job.id, e
        );
    }
    result
}

pub async fn run(
    args: RunArgs,
    global: &GlobalArgs,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let (config, project) = open_project(global, &AnalysisOverrides::default())?;
    let stage = SimulationStage::from(args.stage);
    let jobs = select_jobs(&project, &args.jobs)?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    reporter.phase(format!("Launching {}", stage));
    reporter.report(Progress::TaskStart {
        total: jobs.len() as u64,
    });

    let (mut launched, mut started, mut blocked) = (0usize, 0usize, 0usize);
    for job in jobs {
        reporter.report(Progress::StatusUpdate {
            text: job.id.clone(),
        });
        match simulate::prepare(job, stage, &config.files, &config.simulation) {
            Ok(LaunchPlan::AlreadyStarted) => {
                info!("Job '{}' already started its {} run.", job.id, stage);
                started += 1;
            }
            Ok(LaunchPlan::Run(command)) => {
                if args.dry_run {
                    reporter.message(command.to_string());
                } else {
                    execute(job, &command).await?;
                }
                launched += 1;
            }
            Err(e) => {
                warn!("Skipping job '{}': {}", job.id, e);
                blocked += 1;
            }
        }
        reporter.report(Progress::TaskIncrement { amount: 1 });
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let verb = if args.dry_run { "Would launch" } else { "Launched" };
    println!(
        "{} {} {} run(s); {} already started, {} not ready.",
        verb, launched, stage, started, blocked
    );
    Ok(())
}
