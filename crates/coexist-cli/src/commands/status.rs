use super::open_project;
use crate::cli::{AnalysisOverrides, GlobalArgs};
use crate::error::Result;
use coexist::workflows::status::{self, JobStatus};

fn mark(done: bool) -> &'static str {
    if done { "yes" } else { "no" }
}

pub async fn run(global: &GlobalArgs) -> Result<()> {
    let (config, project) = open_project(global, &AnalysisOverrides::default())?;
    let files = &config.files;

    if project.jobs().is_empty() {
        println!("No jobs found under {:?}.", project.root());
        return Ok(());
    }

    for study in project.studies(&config.keys) {
        println!("Study {} ({})", study.key, study.dir.display());
        for job in &study.jobs {
            println!("  {:<60} {}", job.id, JobStatus::of(job, files).stage());
        }
        println!(
            "  aggregated: {}  points: {}  summarized: {}",
            mark(status::study_aggregated(&study, files)),
            mark(status::points_estimated(&study, files)),
            mark(status::points_summarized(&study, files)),
        );
    }
    Ok(())
}
