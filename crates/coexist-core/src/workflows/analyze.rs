use super::project::{Job, Project, Study};
use super::status;
use crate::core::io::blk::BlockAverages;
use crate::core::io::traits::TabularRecord;
use crate::core::models::estimates::{BoilingPoint, CriticalPoint};
use crate::core::models::records::{AggregateRecord, BoxRecord, Phase, ReplicateSummary};
use crate::engine::aggregator::aggregate_replicates;
use crate::engine::boiling::estimate_boiling_point;
use crate::engine::config::{FileLayout, PipelineConfig};
use crate::engine::critical::{TemperatureSeries, estimate_critical_point};
use crate::engine::error::AnalysisError;
use crate::engine::points::{summarize_boiling_points, summarize_critical_points};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::reducer::reduce_replicate;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReduceReport {
    pub reduced: Vec<String>,
    /// Jobs whose production run has not completed.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    pub studies: Vec<String>,
    pub statepoints: usize,
    /// State points aggregated from a single replicate.
    pub degenerate: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointsReport {
    pub studies: Vec<String>,
    pub series: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryReport {
    pub studies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub reduce: ReduceReport,
    pub aggregate: AggregateReport,
    pub points: PointsReport,
    pub summarize: SummaryReport,
}

fn remove_if_exists(path: &Path) -> Result<(), AnalysisError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed stale output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AnalysisError::io(path, e)),
    }
}

/// Deletes the study outputs that derive from replicate summaries.
fn invalidate_study(
    study: &Study<'_>,
    files: &FileLayout,
    include_aggregates: bool,
) -> Result<(), AnalysisError> {
    if include_aggregates {
        for phase in Phase::BOTH {
            remove_if_exists(&study.path(files.aggregate(phase)))?;
        }
    }
    for name in files.point_files() {
        remove_if_exists(&study.path(name))?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), AnalysisError> {
    fs::create_dir_all(path).map_err(|e| AnalysisError::io(path, e))
}

fn read_replicate_summary(job: &Job, files: &FileLayout) -> Result<ReplicateSummary, AnalysisError> {
    let read = |phase: Phase| {
        let path = job.path(files.replicate_summary(phase));
        BoxRecord::read_first_from_path(&path).map_err(|e| AnalysisError::table(path, e))
    };
    Ok(ReplicateSummary {
        liquid: read(Phase::Liquid)?,
        vapor: read(Phase::Vapor)?,
    })
}

/// Reduces one job; `Ok(false)` when its production run has not completed.
fn reduce_job(job: &Job, config: &PipelineConfig) -> Result<bool, AnalysisError> {
    let files = &config.files;
    if !status::simulation_completed(job, &files.production_control) {
        return Ok(false);
    }
    let temperature = job.temperature(&config.keys)?;

    let read = |index: usize| {
        let path = job.path(files.block_averages(index));
        BlockAverages::read_from_path(&path).map_err(|e| AnalysisError::table(path, e))
    };
    let boxes = [read(0)?, read(1)?];
    let summary = reduce_replicate(boxes, temperature, &config.analysis)
        .map_err(|e| AnalysisError::table(&job.dir, e))?;

    for phase in Phase::BOTH {
        let path = job.path(files.replicate_summary(phase));
        summary
            .phase(phase)
            .write_to_path(&path)
            .map_err(|e| AnalysisError::table(path, e))?;
    }
    Ok(true)
}

/// Averages every completed replicate into its liquid and vapor summaries.
///
/// All study outputs are deleted first, since they derive from the
/// summaries being rewritten.
#[instrument(skip_all, name = "reduce_stage")]
pub fn reduce(
    project: &Project,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<ReduceReport, AnalysisError> {
    reporter.phase("Reducing replicates");
    for study in project.studies(&config.keys) {
        invalidate_study(&study, &config.files, true)?;
    }

    let jobs = project.jobs();
    reporter.report(Progress::TaskStart {
        total: jobs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = jobs.iter();

    #[cfg(feature = "parallel")]
    let iterator = jobs.par_iter();

    let results: Vec<Result<bool, AnalysisError>> = iterator
        .map(|job| {
            let result = reduce_job(job, config);
            reporter.report(Progress::TaskIncrement { amount: 1 });
            result
        })
        .collect();
    reporter.report(Progress::TaskFinish);

    let mut report = ReduceReport::default();
    for (job, result) in jobs.iter().zip(results) {
        if result? {
            report.reduced.push(job.id.clone());
        } else {
            report.skipped.push(job.id.clone());
        }
    }
    reporter.report(Progress::PhaseFinish);

    if !report.skipped.is_empty() {
        warn!(
            skipped = report.skipped.len(),
            "Some jobs have not completed their production run"
        );
    }
    info!(
        reduced = report.reduced.len(),
        skipped = report.skipped.len(),
        "Reduce stage complete"
    );
    Ok(report)
}

/// Appends one cross-replicate row per state point to each study's liquid
/// and vapor aggregate tables, ascending in temperature.
#[instrument(skip_all, name = "aggregate_stage")]
pub fn aggregate(
    project: &Project,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<AggregateReport, AnalysisError> {
    let files = &config.files;
    let studies = project.studies(&config.keys);
    reporter.phase("Aggregating replicates");
    reporter.report(Progress::TaskStart {
        total: studies.len() as u64,
    });

    let mut report = AggregateReport::default();
    for study in &studies {
        if let Some(job) = study.jobs.iter().find(|j| !status::replicate_reduced(j, files)) {
            return Err(AnalysisError::Precondition {
                stage: format!("aggregation of study {}", study.key),
                reason: format!("job {} has not been reduced", job.id),
            });
        }
        invalidate_study(study, files, true)?;
        ensure_dir(&study.dir)?;

        let mut liquid = Vec::new();
        let mut vapor = Vec::new();
        for group in study.statepoint_groups(&config.keys)? {
            let summaries = group
                .jobs
                .iter()
                .map(|job| read_replicate_summary(job, files))
                .collect::<Result<Vec<_>, _>>()?;
            let label = group.key.to_string();
            let aggregate = aggregate_replicates(&label, &summaries, &config.analysis)?;
            if aggregate.is_degenerate() {
                report.degenerate.push(label);
            }
            liquid.push(aggregate.liquid);
            vapor.push(aggregate.vapor);
        }

        report.statepoints += liquid.len();
        for (phase, rows) in [(Phase::Liquid, &liquid), (Phase::Vapor, &vapor)] {
            let path = study.path(files.aggregate(phase));
            AggregateRecord::append_all_to_path(rows, &path)
                .map_err(|e| AnalysisError::table(path, e))?;
        }
        report.studies.push(study.key.slug());
        reporter.report(Progress::TaskIncrement { amount: 1 });
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(
        studies = report.studies.len(),
        statepoints = report.statepoints,
        degenerate = report.degenerate.len(),
        "Aggregate stage complete"
    );
    Ok(report)
}

/// Estimates critical and boiling points for every replica series.
///
/// Rows are written only after every series of a study succeeded, so a
/// failure leaves no partial point tables behind.
#[instrument(skip_all, name = "points_stage")]
pub fn estimate_points(
    project: &Project,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<PointsReport, AnalysisError> {
    let files = &config.files;
    let studies = project.studies(&config.keys);
    reporter.phase("Estimating critical and boiling points");
    reporter.report(Progress::TaskStart {
        total: studies.len() as u64,
    });

    let mut report = PointsReport::default();
    for study in &studies {
        if !status::study_aggregated(study, files) {
            return Err(AnalysisError::Precondition {
                stage: format!("point estimation of study {}", study.key),
                reason: "replicates have not been aggregated".into(),
            });
        }
        invalidate_study(study, files, false)?;

        let mut critical_points = Vec::new();
        let mut boiling_points = Vec::new();
        for series in study.replica_series(&config.keys)? {
            let summaries = series
                .jobs
                .iter()
                .map(|job| read_replicate_summary(job, files))
                .collect::<Result<Vec<_>, _>>()?;
            let (liquid, vapor): (Vec<BoxRecord>, Vec<BoxRecord>) =
                summaries.into_iter().map(|s| (s.liquid, s.vapor)).unzip();

            let temperatures = TemperatureSeries::from_records(&liquid, &vapor)?;
            let critical = estimate_critical_point(&temperatures, &config.analysis.critical)?;
            let boiling = estimate_boiling_point(
                &temperatures,
                critical.temperature,
                &config.analysis.boiling,
            )?;
            debug!(
                series = %series.key,
                tc = critical.temperature,
                tbp = boiling.temperature,
                "Estimated points"
            );
            critical_points.push(critical);
            boiling_points.push(boiling);
        }

        report.series += critical_points.len();
        let critical_path = study.path(&files.critical_points);
        CriticalPoint::append_all_to_path(&critical_points, &critical_path)
            .map_err(|e| AnalysisError::table(critical_path, e))?;
        let boiling_path = study.path(&files.boiling_points);
        BoilingPoint::append_all_to_path(&boiling_points, &boiling_path)
            .map_err(|e| AnalysisError::table(boiling_path, e))?;

        report.studies.push(study.key.slug());
        reporter.report(Progress::TaskIncrement { amount: 1 });
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(
        studies = report.studies.len(),
        series = report.series,
        "Point estimation complete"
    );
    Ok(report)
}

/// Rewrites each study's critical and boiling point summaries from the
/// per-replicate estimates.
#[instrument(skip_all, name = "summarize_stage")]
pub fn summarize(
    project: &Project,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<SummaryReport, AnalysisError> {
    let files = &config.files;
    let studies = project.studies(&config.keys);
    reporter.phase("Summarizing point estimates");
    reporter.report(Progress::TaskStart {
        total: studies.len() as u64,
    });

    let mut report = SummaryReport::default();
    for study in &studies {
        if !status::points_estimated(study, files) {
            return Err(AnalysisError::Precondition {
                stage: format!("summary of study {}", study.key),
                reason: "points have not been estimated".into(),
            });
        }

        let critical_path = study.path(&files.critical_points);
        let critical = CriticalPoint::read_all_from_path(&critical_path)
            .map_err(|e| AnalysisError::table(&critical_path, e))?;
        let boiling_path = study.path(&files.boiling_points);
        let boiling = BoilingPoint::read_all_from_path(&boiling_path)
            .map_err(|e| AnalysisError::table(&boiling_path, e))?;

        // Both summaries are validated before either file is touched.
        let critical_summary = summarize_critical_points(&critical)?;
        let boiling_summary = summarize_boiling_points(&boiling)?;

        let path = study.path(&files.critical_summary);
        critical_summary
            .write_to_path(&path)
            .map_err(|e| AnalysisError::table(path, e))?;
        let path = study.path(&files.boiling_summary);
        boiling_summary
            .write_to_path(&path)
            .map_err(|e| AnalysisError::table(path, e))?;

        info!(
            study = %study.key,
            tc = critical_summary.temperature.mean,
            tc_std = critical_summary.temperature.std_dev,
            tbp = boiling_summary.temperature.mean,
            replicates = critical_summary.replicates,
            "Summarized study"
        );
        report.studies.push(study.key.slug());
        reporter.report(Progress::TaskIncrement { amount: 1 });
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(report)
}

/// Runs reduce, aggregate, point estimation and summary in order.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run_all(
    project: &Project,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<PipelineReport, AnalysisError> {
    Ok(PipelineReport {
        reduce: reduce(project, config, reporter)?,
        aggregate: aggregate(project, config, reporter)?,
        points: estimate_points(project, config, reporter)?,
        summarize: summarize(project, config, reporter)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::estimates::{BoilingPointSummary, CriticalPointSummary};
    use crate::workflows::project::tests::write_job;
    use tempfile::{TempDir, tempdir};

    const TC: f64 = 600.0;
    const RHO_C: f64 = 300.0;
    const HEADER: &str =
        "#STEP PRESSURE TOT_MOL TOT_DENS VOLUME HEAT_VAP COMPRESSIBILITY MOLFRACT_C2H6";

    fn blk_text(density: f64, pressure: f64) -> String {
        let mut text = format!("{HEADER}\n");
        for step in [1000, 2000] {
            text.push_str(&format!(
                "{step} {pressure} 250 {density} 27000 15.5 0.95 1\n"
            ));
        }
        text
    }

    /// Writes the production output of a job on an exact scaling-law curve.
    /// With `swap`, the vapor box is box 0.
    pub(crate) fn write_production(dir: &Path, t: f64, swap: bool) {
        let diameter = RHO_C + 0.5 * (TC - t);
        let half_gap = 25.0 * (TC - t).powf(0.325);
        let pressure = (10.0 - 3000.0 / t).exp();
        let liquid = blk_text(diameter + half_gap, pressure);
        let vapor = blk_text(diameter - half_gap, pressure);
        let (box0, box1) = if swap { (vapor, liquid) } else { (liquid, vapor) };
        fs::write(dir.join("Blk_gomc_production_run_BOX_0.dat"), box0).unwrap();
        fs::write(dir.join("Blk_gomc_production_run_BOX_1.dat"), box1).unwrap();
        fs::write(
            dir.join("out_gomc_production_run.dat"),
            "Move Type Mol. Kind Accepted\n",
        )
        .unwrap();
    }

    pub(crate) fn completed_project() -> (TempDir, Project) {
        let tmp = tempdir().unwrap();
        for (i, t) in [500.0, 520.0, 540.0, 560.0, 580.0].into_iter().enumerate() {
            for replica in 0..2 {
                let dir = write_job(tmp.path(), &format!("job{i}{replica}"), "ethane", t, replica);
                write_production(&dir, t, replica == 1);
            }
        }
        let project = Project::open(tmp.path(), &FileLayout::default()).unwrap();
        (tmp, project)
    }

    #[test]
    fn full_pipeline_recovers_critical_and_boiling_points() {
        let (_tmp, project) = completed_project();
        let config = PipelineConfig::default();
        let report = run_all(&project, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(report.reduce.reduced.len(), 10);
        assert!(report.reduce.skipped.is_empty());
        assert_eq!(report.aggregate.statepoints, 5);
        assert!(report.aggregate.degenerate.is_empty());
        assert_eq!(report.points.series, 2);
        assert_eq!(report.summarize.studies, vec!["molecule=ethane".to_string()]);

        let study_dir = project.analysis_dir().join("molecule=ethane");
        let critical = CriticalPointSummary::read_first_from_path(
            study_dir.join(&config.files.critical_summary),
        )
        .unwrap();
        assert!((critical.temperature.mean - TC).abs() < 1e-6);
        assert!((critical.density.mean - RHO_C).abs() < 1e-6);
        assert!(critical.temperature.std_dev.abs() < 1e-6);
        assert_eq!(critical.replicates, 2);
        assert_eq!(critical.window.count, 5);

        let boiling = BoilingPointSummary::read_first_from_path(
            study_dir.join(&config.files.boiling_summary),
        )
        .unwrap();
        let expected_tbp = -3000.0 / (1.01325_f64.ln() - 10.0);
        assert!((boiling.temperature.mean - expected_tbp).abs() < 1e-6);
        assert!((boiling.heat_of_vaporization.mean - 3000.0 * 0.008134).abs() < 1e-6);
    }

    #[test]
    fn reduced_boxes_are_ordered_by_density() {
        let (_tmp, project) = completed_project();
        let config = PipelineConfig::default();
        reduce(&project, &config, &ProgressReporter::new()).unwrap();
        for job in project.jobs() {
            let summary = read_replicate_summary(job, &config.files).unwrap();
            assert!(summary.liquid.properties.density >= summary.vapor.properties.density);
            assert!((summary.liquid.properties.box_length - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rerunning_aggregate_does_not_duplicate_rows() {
        let (_tmp, project) = completed_project();
        let config = PipelineConfig::default();
        let reporter = ProgressReporter::new();
        reduce(&project, &config, &reporter).unwrap();
        aggregate(&project, &config, &reporter).unwrap();
        aggregate(&project, &config, &reporter).unwrap();

        let path = project
            .analysis_dir()
            .join("molecule=ethane")
            .join(config.files.aggregate(Phase::Liquid));
        let rows = AggregateRecord::read_all_from_path(&path).unwrap();
        assert_eq!(rows.len(), 5);
        let temps: Vec<f64> = rows.iter().map(|r| r.temperature.mean).collect();
        assert_eq!(temps, vec![500.0, 520.0, 540.0, 560.0, 580.0]);
        assert_eq!(rows[0].replicates, 2);
    }

    #[test]
    fn studies_with_similar_names_keep_separate_tables() {
        let tmp = tempdir().unwrap();
        for molecule in ["n_butane", "n-butane"] {
            for (i, t) in [500.0, 520.0, 540.0, 560.0, 580.0].into_iter().enumerate() {
                for replica in 0..2 {
                    let id = format!("{molecule}{i}{replica}");
                    let dir = write_job(tmp.path(), &id, molecule, t, replica);
                    write_production(&dir, t, false);
                }
            }
        }
        let project = Project::open(tmp.path(), &FileLayout::default()).unwrap();
        let config = PipelineConfig::default();
        let reporter = ProgressReporter::new();
        reduce(&project, &config, &reporter).unwrap();
        let report = aggregate(&project, &config, &reporter).unwrap();
        assert_eq!(report.statepoints, 10);

        let studies = project.studies(&config.keys);
        assert_eq!(studies.len(), 2);
        assert_ne!(studies[0].dir, studies[1].dir);
        for study in &studies {
            let path = study.path(config.files.aggregate(Phase::Liquid));
            let rows = AggregateRecord::read_all_from_path(&path).unwrap();
            assert_eq!(rows.len(), 5, "{}", study.key);
        }
    }

    #[test]
    fn reduce_invalidates_downstream_outputs() {
        let (_tmp, project) = completed_project();
        let config = PipelineConfig::default();
        let reporter = ProgressReporter::new();
        run_all(&project, &config, &reporter).unwrap();

        let study_dir = project.analysis_dir().join("molecule=ethane");
        assert!(study_dir.join(&config.files.critical_summary).exists());
        reduce(&project, &config, &reporter).unwrap();
        assert!(!study_dir.join(&config.files.critical_summary).exists());
        assert!(!study_dir.join(config.files.aggregate(Phase::Vapor)).exists());
    }

    #[test]
    fn incomplete_jobs_are_skipped_and_block_aggregation() {
        let (tmp, project) = completed_project();
        fs::remove_file(tmp.path().join("workspace/job00/out_gomc_production_run.dat")).unwrap();
        let config = PipelineConfig::default();
        let reporter = ProgressReporter::new();

        let report = reduce(&project, &config, &reporter).unwrap();
        assert_eq!(report.skipped, vec!["job00".to_string()]);
        assert!(matches!(
            aggregate(&project, &config, &reporter),
            Err(AnalysisError::Precondition { .. })
        ));
    }

    #[test]
    fn mismatched_windows_leave_summaries_untouched() {
        let (_tmp, project) = completed_project();
        let config = PipelineConfig::default();
        let reporter = ProgressReporter::new();
        run_all(&project, &config, &reporter).unwrap();

        let study_dir = project.analysis_dir().join("molecule=ethane");
        let summary_path = study_dir.join(&config.files.critical_summary);
        let before = fs::read_to_string(&summary_path).unwrap();

        let points_path = study_dir.join(&config.files.critical_points);
        let mut points = CriticalPoint::read_all_from_path(&points_path).unwrap();
        points[1].window.lowest = 520.0;
        CriticalPoint::write_all_to_path(&points, &points_path).unwrap();

        let err = summarize(&project, &config, &reporter).unwrap_err();
        assert!(matches!(err, AnalysisError::WindowMismatch { .. }));
        assert_eq!(fs::read_to_string(&summary_path).unwrap(), before);
    }
}
