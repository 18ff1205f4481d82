use crate::core::models::statepoint::{ParamValue, StatePoint};
use crate::engine::config::FileLayout;
use crate::engine::error::ProjectError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// A study definition: fixed parameters plus lists of values to sweep.
///
/// ```toml
/// [parameters]
/// molecule = "ethane"
///
/// [sweep]
/// production_temperature_K = [500.0, 520.0, 540.0]
/// replica_number_int = [0, 1, 2]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyDefinition {
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub sweep: BTreeMap<String, Vec<ParamValue>>,
}

impl StudyDefinition {
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(path).map_err(|e| ProjectError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ProjectError::Study {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The Cartesian product of the sweep, each combined with the fixed
    /// parameters.
    pub fn expand(&self) -> Result<Vec<StatePoint>, String> {
        if let Some(key) = self.sweep.keys().find(|k| self.parameters.contains_key(*k)) {
            return Err(format!("'{key}' is both fixed and swept"));
        }
        if let Some((key, _)) = self.sweep.iter().find(|(_, values)| values.is_empty()) {
            return Err(format!("sweep of '{key}' has no values"));
        }

        let base: StatePoint = self
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut points = vec![base];
        for (key, values) in &self.sweep {
            points = points
                .iter()
                .flat_map(|sp| {
                    values.iter().map(move |value| {
                        let mut next = sp.clone();
                        next.insert(key.clone(), value.clone());
                        next
                    })
                })
                .collect();
        }
        Ok(points)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// Identifier of the job directory for a state point.
pub fn job_id(statepoint: &StatePoint) -> String {
    statepoint.group_key(&[]).slug()
}

/// Creates one job directory per state point of the study. Jobs that already
/// exist are left untouched.
#[instrument(skip_all, name = "init_workflow")]
pub fn init_project(
    root: &Path,
    definition: &StudyDefinition,
    definition_path: &Path,
    files: &FileLayout,
) -> Result<InitReport, ProjectError> {
    let statepoints = definition.expand().map_err(|reason| ProjectError::Study {
        path: definition_path.to_path_buf(),
        reason,
    })?;

    let workspace = root.join(&files.workspace_dir);
    let mut report = InitReport::default();
    for statepoint in statepoints {
        let id = job_id(&statepoint);
        let dir: PathBuf = workspace.join(&id);
        let statepoint_path = dir.join(&files.statepoint_file);
        if statepoint_path.exists() {
            report.existing.push(id);
            continue;
        }

        fs::create_dir_all(&dir).map_err(|e| ProjectError::Io {
            path: dir.clone(),
            source: e,
        })?;
        let content = toml::to_string(&statepoint).map_err(|e| ProjectError::Serialize {
            job: id.clone(),
            source: e,
        })?;
        fs::write(&statepoint_path, content).map_err(|e| ProjectError::Io {
            path: statepoint_path.clone(),
            source: e,
        })?;
        report.created.push(id);
    }

    info!(
        created = report.created.len(),
        existing = report.existing.len(),
        "Initialized project workspace"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::project::Project;
    use tempfile::tempdir;

    const STUDY: &str = r#"
        [parameters]
        molecule = "ethane"

        [sweep]
        production_temperature_K = [500.0, 520.0, 540.0]
        replica_number_int = [0, 1]
    "#;

    #[test]
    fn sweep_expands_to_cartesian_product() {
        let definition: StudyDefinition = toml::from_str(STUDY).unwrap();
        let points = definition.expand().unwrap();
        assert_eq!(points.len(), 6);
        assert!(points.iter().all(|sp| sp.len() == 3));
        assert!(points.iter().all(|sp| sp.get("molecule").is_some()));
    }

    #[test]
    fn key_in_both_tables_is_rejected() {
        let definition: StudyDefinition = toml::from_str(
            r#"
            [parameters]
            replica_number_int = 0
            [sweep]
            replica_number_int = [0, 1]
            "#,
        )
        .unwrap();
        assert!(definition.expand().unwrap_err().contains("replica_number_int"));
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let definition: StudyDefinition =
            toml::from_str("[sweep]\nproduction_temperature_K = []\n").unwrap();
        assert!(definition.expand().is_err());
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(toml::from_str::<StudyDefinition>("[extra]\na = 1\n").is_err());
    }

    #[test]
    fn init_creates_jobs_once() {
        let tmp = tempdir().unwrap();
        let definition: StudyDefinition = toml::from_str(STUDY).unwrap();
        let files = FileLayout::default();
        let study_path = tmp.path().join("study.toml");

        let first = init_project(tmp.path(), &definition, &study_path, &files).unwrap();
        assert_eq!(first.created.len(), 6);
        assert!(first.existing.is_empty());

        let second = init_project(tmp.path(), &definition, &study_path, &files).unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.existing.len(), 6);

        let project = Project::open(tmp.path(), &files).unwrap();
        assert_eq!(project.jobs().len(), 6);
        assert!(
            project
                .job("molecule=ethane,production_temperature_K=520,replica_number_int=1")
                .is_some()
        );
    }
}
