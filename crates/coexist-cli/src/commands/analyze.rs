use super::open_project;
use crate::cli::{AnalyzeArgs, AnalyzeStage, GlobalArgs};
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use coexist::engine::progress::ProgressReporter;
use coexist::workflows::analyze::{
    self, AggregateReport, PointsReport, ReduceReport, SummaryReport,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

fn print_reduce(report: &ReduceReport) {
    println!(
        "Reduced {} replicate(s); skipped {} without a completed production run.",
        report.reduced.len(),
        report.skipped.len()
    );
    for id in &report.skipped {
        println!("  - {}", id);
    }
}

fn print_aggregate(report: &AggregateReport) {
    println!(
        "Aggregated {} state point(s) across {} study(ies).",
        report.statepoints,
        report.studies.len()
    );
    if !report.degenerate.is_empty() {
        warn!(
            "{} state point(s) have a single replicate; their standard deviations are NaN.",
            report.degenerate.len()
        );
        for label in &report.degenerate {
            println!("  ! {}", label);
        }
    }
}

fn print_points(report: &PointsReport) {
    println!(
        "Estimated critical and boiling points for {} replica series across {} study(ies).",
        report.series,
        report.studies.len()
    );
}

fn print_summary(report: &SummaryReport) {
    println!("Summarized {} study(ies).", report.studies.len());
}

pub async fn run(
    args: AnalyzeArgs,
    global: &GlobalArgs,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let (config, project) = open_project(global, &args.overrides)?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the {:?} analysis stage...", args.stage);
    tokio::task::block_in_place(|| -> Result<()> {
        match args.stage {
            AnalyzeStage::Reduce => print_reduce(&analyze::reduce(&project, &config, &reporter)?),
            AnalyzeStage::Aggregate => {
                print_aggregate(&analyze::aggregate(&project, &config, &reporter)?)
            }
            AnalyzeStage::Points => {
                print_points(&analyze::estimate_points(&project, &config, &reporter)?)
            }
            AnalyzeStage::Summarize => {
                print_summary(&analyze::summarize(&project, &config, &reporter)?)
            }
            AnalyzeStage::All => {
                let report = analyze::run_all(&project, &config, &reporter)?;
                print_reduce(&report.reduce);
                print_aggregate(&report.aggregate);
                print_points(&report.points);
                print_summary(&report.summarize);
            }
        }
        Ok(())
    })
}
