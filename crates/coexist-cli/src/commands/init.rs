use crate::cli::{AnalysisOverrides, GlobalArgs, InitArgs};
use crate::config::{ConfigSources, build_config};
use crate::error::Result;
use coexist::workflows::init::{StudyDefinition, init_project};
use tracing::info;

pub async fn run(args: InitArgs, global: &GlobalArgs) -> Result<()> {
    let overrides = AnalysisOverrides::default();
    let config = build_config(&ConfigSources::new(global, &overrides))?;

    info!("Loading study definition from {:?}", &args.study);
    let definition = StudyDefinition::load(&args.study)?;
    let report = init_project(&global.project_dir, &definition, &args.study, &config.files)?;

    println!(
        "Initialized {} new job(s); {} already existed.",
        report.created.len(),
        report.existing.len()
    );
    for id in &report.created {
        println!("  + {}", id);
    }
    Ok(())
}
