pub mod analyze;
pub mod init;
pub mod report;
pub mod run;
pub mod status;

use crate::cli::{AnalysisOverrides, GlobalArgs};
use crate::config::{ConfigSources, build_config};
use crate::error::Result;
use coexist::engine::config::PipelineConfig;
use coexist::workflows::project::Project;
use tracing::info;

/// Resolves the configuration and opens the project it points at.
fn open_project(
    global: &GlobalArgs,
    overrides: &AnalysisOverrides,
) -> Result<(PipelineConfig, Project)> {
    let config = build_config(&ConfigSources::new(global, overrides))?;
    let project = Project::open(&global.project_dir, &config.files)?;
    info!(
        "Opened project at {:?} with {} job(s).",
        project.root(),
        project.jobs().len()
    );
    Ok((config, project))
}
