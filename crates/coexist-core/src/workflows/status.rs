//! Stage predicates: pure checks of what has been produced on disk.
//!
//! Each predicate answers one question about a job or study directory and
//! never fails; unreadable files count as "not done".

use super::project::{Job, Study};
use crate::core::io::traits::TabularRecord;
use crate::core::models::records::{BoxRecord, Phase};
use crate::engine::config::FileLayout;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Token sequence the engine prints once its run finished.
const COMPLETION_MARKER: [&str; 4] = ["Move", "Type", "Mol.", "Kind"];

fn any_line(path: &Path, mut matches: impl FnMut(&[&str]) -> bool) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .any(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            matches(&tokens)
        })
}

pub fn input_files_written(job: &Job, files: &FileLayout) -> bool {
    let [psf, pdb] = files.box_structure_files();
    job.path(files.force_field_file()).is_file()
        && job.path(psf).is_file()
        && job.path(pdb).is_file()
}

/// The control file exists and names its output.
pub fn control_file_written(job: &Job, control: &str) -> bool {
    any_line(&job.path(FileLayout::control_file(control)), |tokens| {
        tokens.first() == Some(&"OutputName")
    })
}

pub fn simulation_started(job: &Job, control: &str) -> bool {
    job.path(FileLayout::console_file(control)).is_file()
        && job.path(FileLayout::merged_structure_file(control)).is_file()
}

pub fn simulation_completed(job: &Job, control: &str) -> bool {
    any_line(&job.path(FileLayout::console_file(control)), |tokens| {
        tokens.starts_with(&COMPLETION_MARKER)
    })
}

/// Both replicate summaries exist and parse.
pub fn replicate_reduced(job: &Job, files: &FileLayout) -> bool {
    Phase::BOTH
        .iter()
        .all(|&phase| BoxRecord::read_first_from_path(job.path(files.replicate_summary(phase))).is_ok())
}

pub fn study_aggregated(study: &Study<'_>, files: &FileLayout) -> bool {
    Phase::BOTH
        .iter()
        .all(|&phase| study.path(files.aggregate(phase)).is_file())
}

pub fn points_estimated(study: &Study<'_>, files: &FileLayout) -> bool {
    study.path(&files.critical_points).is_file() && study.path(&files.boiling_points).is_file()
}

pub fn points_summarized(study: &Study<'_>, files: &FileLayout) -> bool {
    study.path(&files.critical_summary).is_file() && study.path(&files.boiling_summary).is_file()
}

/// Every job predicate evaluated at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStatus {
    pub input_files_written: bool,
    pub equilibration_control_written: bool,
    pub production_control_written: bool,
    pub equilibration_started: bool,
    pub equilibration_completed: bool,
    pub production_started: bool,
    pub production_completed: bool,
    pub reduced: bool,
}

impl JobStatus {
    pub fn of(job: &Job, files: &FileLayout) -> Self {
        Self {
            input_files_written: input_files_written(job, files),
            equilibration_control_written: control_file_written(job, &files.equilibration_control),
            production_control_written: control_file_written(job, &files.production_control),
            equilibration_started: simulation_started(job, &files.equilibration_control),
            equilibration_completed: simulation_completed(job, &files.equilibration_control),
            production_started: simulation_started(job, &files.production_control),
            production_completed: simulation_completed(job, &files.production_control),
            reduced: replicate_reduced(job, files),
        }
    }

    /// Short label of the furthest stage the job has reached.
    pub fn stage(&self) -> &'static str {
        if self.reduced {
            "reduced"
        } else if self.production_completed {
            "production done"
        } else if self.production_started {
            "production running"
        } else if self.equilibration_completed {
            "equilibrated"
        } else if self.equilibration_started {
            "equilibration running"
        } else if self.equilibration_control_written && self.production_control_written {
            "ready"
        } else if self.input_files_written {
            "inputs written"
        } else {
            "new"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::statepoint::StatePoint;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn job() -> (TempDir, Job) {
        let tmp = tempdir().unwrap();
        let job = Job {
            id: "j".into(),
            dir: tmp.path().to_path_buf(),
            statepoint: StatePoint::new(),
        };
        (tmp, job)
    }

    #[test]
    fn fresh_job_has_done_nothing() {
        let (_tmp, job) = job();
        let status = JobStatus::of(&job, &FileLayout::default());
        assert_eq!(status, JobStatus::default());
        assert_eq!(status.stage(), "new");
    }

    #[test]
    fn input_files_need_force_field_and_both_structures() {
        let (tmp, job) = job();
        let files = FileLayout::default();
        fs::write(tmp.path().join("in_gomc_FF.inp"), "").unwrap();
        fs::write(tmp.path().join("mosdef_box_0.psf"), "").unwrap();
        assert!(!input_files_written(&job, &files));
        fs::write(tmp.path().join("mosdef_box_0.pdb"), "").unwrap();
        assert!(input_files_written(&job, &files));
    }

    #[test]
    fn control_file_requires_output_name_as_first_token() {
        let (tmp, job) = job();
        let path = tmp.path().join("run.conf");
        fs::write(&path, "# OutputName is set below\n").unwrap();
        assert!(!control_file_written(&job, "run"));
        fs::write(&path, "Restart false\nOutputName  run\n").unwrap();
        assert!(control_file_written(&job, "run"));
    }

    #[test]
    fn started_needs_console_and_merged_structure() {
        let (tmp, job) = job();
        fs::write(tmp.path().join("out_run.dat"), "").unwrap();
        assert!(!simulation_started(&job, "run"));
        fs::write(tmp.path().join("run_merged.psf"), "").unwrap();
        assert!(simulation_started(&job, "run"));
        assert!(!simulation_completed(&job, "run"));
    }

    #[test]
    fn completion_marker_is_matched_by_tokens() {
        let (tmp, job) = job();
        fs::write(
            tmp.path().join("out_run.dat"),
            "Step 100\n   Move   Type Mol.  Kind  Accepted\n",
        )
        .unwrap();
        assert!(simulation_completed(&job, "run"));
    }

    #[test]
    fn unparsable_summary_is_not_reduced() {
        let (tmp, job) = job();
        let files = FileLayout::default();
        fs::write(tmp.path().join(files.replicate_summary(Phase::Liquid)), "temp_K\n").unwrap();
        fs::write(tmp.path().join(files.replicate_summary(Phase::Vapor)), "temp_K\n").unwrap();
        assert!(!replicate_reduced(&job, &files));
    }
}
