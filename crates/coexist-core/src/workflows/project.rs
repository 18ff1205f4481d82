use crate::core::models::statepoint::{GroupKey, StatePoint};
use crate::engine::config::{FileLayout, StatePointKeys};
use crate::engine::error::ProjectError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One simulation: a directory under the workspace holding a state point.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub dir: PathBuf,
    pub statepoint: StatePoint,
}

impl Job {
    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(name)
    }

    fn numeric(&self, key: &str) -> Result<f64, ProjectError> {
        self.statepoint
            .get_f64(key)
            .ok_or_else(|| ProjectError::MissingParameter {
                job: self.id.clone(),
                key: key.to_string(),
            })
    }

    pub fn temperature(&self, keys: &StatePointKeys) -> Result<f64, ProjectError> {
        self.numeric(&keys.temperature)
    }

    pub fn replica(&self, keys: &StatePointKeys) -> Result<f64, ProjectError> {
        self.numeric(&keys.replica)
    }
}

/// Jobs sharing every parameter except temperature and replica index; the
/// unit whose analysis outputs share one directory.
#[derive(Debug, Clone)]
pub struct Study<'a> {
    pub key: GroupKey,
    pub dir: PathBuf,
    pub jobs: Vec<&'a Job>,
}

/// Replicates of one temperature within a study.
#[derive(Debug, Clone)]
pub struct StatePointGroup<'a> {
    pub key: GroupKey,
    pub temperature: f64,
    pub jobs: Vec<&'a Job>,
}

/// All temperatures of one replica index within a study, ascending.
#[derive(Debug, Clone)]
pub struct ReplicaSeries<'a> {
    pub key: GroupKey,
    pub jobs: Vec<&'a Job>,
}

impl<'a> Study<'a> {
    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(name)
    }

    /// State points of the study in ascending temperature.
    pub fn statepoint_groups(
        &self,
        keys: &StatePointKeys,
    ) -> Result<Vec<StatePointGroup<'a>>, ProjectError> {
        let mut groups = Vec::new();
        for (key, jobs) in group_jobs(self.jobs.iter().copied(), &[keys.replica.as_str()]) {
            let temperature = jobs[0].temperature(keys)?;
            groups.push(StatePointGroup {
                key,
                temperature,
                jobs,
            });
        }
        groups.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
        Ok(groups)
    }

    /// Temperature series of the study, one per replica index, each sorted by
    /// ascending temperature.
    pub fn replica_series(
        &self,
        keys: &StatePointKeys,
    ) -> Result<Vec<ReplicaSeries<'a>>, ProjectError> {
        let mut series = Vec::new();
        for (key, jobs) in group_jobs(self.jobs.iter().copied(), &[keys.temperature.as_str()]) {
            let mut keyed = jobs
                .into_iter()
                .map(|job| Ok((job.temperature(keys)?, job)))
                .collect::<Result<Vec<_>, ProjectError>>()?;
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            series.push(ReplicaSeries {
                key,
                jobs: keyed.into_iter().map(|(_, job)| job).collect(),
            });
        }
        Ok(series)
    }
}

fn group_jobs<'a>(
    jobs: impl IntoIterator<Item = &'a Job>,
    excluded: &[&str],
) -> BTreeMap<GroupKey, Vec<&'a Job>> {
    let mut groups: BTreeMap<GroupKey, Vec<&'a Job>> = BTreeMap::new();
    for job in jobs {
        groups
            .entry(job.statepoint.group_key(excluded))
            .or_default()
            .push(job);
    }
    groups
}

/// A project root with its discovered jobs.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    files: FileLayout,
    jobs: Vec<Job>,
}

impl Project {
    /// Scans `<root>/<workspace>/*/<statepoint file>` for jobs.
    pub fn open(root: impl Into<PathBuf>, files: &FileLayout) -> Result<Self, ProjectError> {
        let root = root.into();
        let workspace = root.join(&files.workspace_dir);
        if !workspace.is_dir() {
            return Err(ProjectError::MissingWorkspace(root));
        }

        let entries = fs::read_dir(&workspace).map_err(|e| ProjectError::Io {
            path: workspace.clone(),
            source: e,
        })?;
        let mut jobs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ProjectError::Io {
                path: workspace.clone(),
                source: e,
            })?;
            let dir = entry.path();
            let statepoint_path = dir.join(&files.statepoint_file);
            if !statepoint_path.is_file() {
                continue;
            }
            let statepoint = read_statepoint(&statepoint_path)?;
            jobs.push(Job {
                id: entry.file_name().to_string_lossy().into_owned(),
                dir,
                statepoint,
            });
        }
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(root = %root.display(), jobs = jobs.len(), "Opened project");

        Ok(Self {
            root,
            files: files.clone(),
            jobs,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn analysis_dir(&self) -> PathBuf {
        self.root.join(&self.files.analysis_dir)
    }

    /// Jobs grouped into studies, ordered by study key.
    pub fn studies(&self, keys: &StatePointKeys) -> Vec<Study<'_>> {
        let excluded = [keys.temperature.as_str(), keys.replica.as_str()];
        group_jobs(&self.jobs, &excluded)
            .into_iter()
            .map(|(key, jobs)| Study {
                dir: self.analysis_dir().join(key.slug()),
                key,
                jobs,
            })
            .collect()
    }
}

pub fn read_statepoint(path: &Path) -> Result<StatePoint, ProjectError> {
    let content = fs::read_to_string(path).map_err(|e| ProjectError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ProjectError::StatePoint {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::statepoint::ParamValue;
    use tempfile::{TempDir, tempdir};

    pub(crate) fn write_job(root: &Path, id: &str, molecule: &str, t: f64, replica: i64) -> PathBuf {
        let dir = root.join("workspace").join(id);
        fs::create_dir_all(&dir).unwrap();
        let mut sp = StatePoint::new();
        sp.insert("molecule", ParamValue::Text(molecule.into()));
        sp.insert("production_temperature_K", ParamValue::Float(t));
        sp.insert("replica_number_int", ParamValue::Integer(replica));
        fs::write(dir.join("statepoint.toml"), toml::to_string(&sp).unwrap()).unwrap();
        dir
    }

    fn project() -> (TempDir, Project) {
        let tmp = tempdir().unwrap();
        write_job(tmp.path(), "j1", "ethane", 520.0, 0);
        write_job(tmp.path(), "j2", "ethane", 500.0, 0);
        write_job(tmp.path(), "j3", "ethane", 500.0, 1);
        write_job(tmp.path(), "j4", "ethane", 520.0, 1);
        write_job(tmp.path(), "j5", "propane", 400.0, 0);
        fs::create_dir_all(tmp.path().join("workspace").join("stray")).unwrap();
        let project = Project::open(tmp.path(), &FileLayout::default()).unwrap();
        (tmp, project)
    }

    #[test]
    fn open_discovers_jobs_with_statepoints_only() {
        let (_tmp, project) = project();
        let ids: Vec<&str> = project.jobs().iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j2", "j3", "j4", "j5"]);
        assert!(project.job("stray").is_none());
    }

    #[test]
    fn missing_workspace_is_reported() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            Project::open(tmp.path(), &FileLayout::default()),
            Err(ProjectError::MissingWorkspace(_))
        ));
    }

    #[test]
    fn studies_group_everything_but_temperature_and_replica() {
        let (_tmp, project) = project();
        let studies = project.studies(&StatePointKeys::default());
        assert_eq!(studies.len(), 2);
        assert_eq!(studies[0].key.slug(), "molecule=ethane");
        assert_eq!(studies[0].jobs.len(), 4);
        assert!(studies[0].dir.ends_with("analysis/molecule=ethane"));
    }

    #[test]
    fn statepoint_groups_are_sorted_by_temperature() {
        let (_tmp, project) = project();
        let keys = StatePointKeys::default();
        let studies = project.studies(&keys);
        let groups = studies[0].statepoint_groups(&keys).unwrap();
        let temps: Vec<f64> = groups.iter().map(|g| g.temperature).collect();
        assert_eq!(temps, vec![500.0, 520.0]);
        assert!(groups.iter().all(|g| g.jobs.len() == 2));
    }

    #[test]
    fn replica_series_hold_one_job_per_temperature() {
        let (_tmp, project) = project();
        let keys = StatePointKeys::default();
        let studies = project.studies(&keys);
        let series = studies[0].replica_series(&keys).unwrap();
        assert_eq!(series.len(), 2);
        let ids: Vec<&str> = series[0].jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j2", "j1"]);
    }

    #[test]
    fn malformed_statepoint_is_an_error() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("workspace").join("bad");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("statepoint.toml"), "not = [valid").unwrap();
        assert!(matches!(
            Project::open(tmp.path(), &FileLayout::default()),
            Err(ProjectError::StatePoint { .. })
        ));
    }
}
