use super::open_project;
use crate::cli::{AnalysisOverrides, GlobalArgs, ReportArgs};
use crate::error::Result;
use coexist::workflows::report::write_project_report;
use tracing::warn;

pub async fn run(args: ReportArgs, global: &GlobalArgs) -> Result<()> {
    let (config, project) = open_project(global, &AnalysisOverrides::default())?;

    let rows = write_project_report(&project, &config, &args.output)?;
    let missing = rows
        .iter()
        .filter(|row| row.critical_temperature.is_none())
        .count();
    if missing > 0 {
        warn!("{} study(ies) have no point summaries yet.", missing);
    }
    println!(
        "Report with {} study(ies) written to: {}",
        rows.len(),
        args.output.display()
    );
    Ok(())
}
