//! Workflow-directory mutators
//!
//! Both sweep variants are expressed as one capability: a [`Mutator`] takes
//! the root of a cloned mirror and rewrites files under
//! `.github/workflows/`. The pipeline is parameterized by the mutator and
//! identical for both variants.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Content written over every workflow file by the disable sweep
pub const DISABLED_MARKER: &str = "# Workflow disabled\n";

/// File installed by the enable sweep
pub const FOSSA_WORKFLOW_FILE: &str = "link_checker.yml";

/// Result of applying a mutation to one mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Files were written (possibly zero, if the directory was empty)
    Applied { files: usize },
    /// The mirror had nothing to mutate; publishing is pointless
    Skipped,
}

/// A file-content transformation applied inside a cloned mirror
pub trait Mutator {
    /// Short label for logging
    fn label(&self) -> &'static str;

    /// Commit message used when publishing the mutation
    fn commit_message(&self) -> &'static str;

    /// Apply the mutation under the mirror's working tree
    fn apply(&self, mirror: &Path) -> Result<MutationOutcome>;
}

/// The workflow directory of a working tree
fn workflow_dir(mirror: &Path) -> PathBuf {
    mirror.join(".github").join("workflows")
}

/// Overwrite every workflow file with the disabled marker
///
/// Only regular files directly inside `.github/workflows` are touched;
/// subdirectories are not traversed. A mirror without the directory is
/// already satisfied and reports [`MutationOutcome::Skipped`].
pub struct DisableWorkflows;

impl Mutator for DisableWorkflows {
    fn label(&self) -> &'static str {
        "disable"
    }

    fn commit_message(&self) -> &'static str {
        "Disable GitHub Actions workflows"
    }

    fn apply(&self, mirror: &Path) -> Result<MutationOutcome> {
        let dir = workflow_dir(mirror);
        if !dir.exists() {
            return Ok(MutationOutcome::Skipped);
        }

        let mut files = 0;
        for entry in std::fs::read_dir(&dir).map_err(Error::Io)? {
            let entry = entry.map_err(Error::Io)?;
            if entry.file_type().map_err(Error::Io)?.is_file() {
                std::fs::write(entry.path(), DISABLED_MARKER).map_err(Error::Io)?;
                debug!(file = %entry.path().display(), "Disabled workflow");
                files += 1;
            }
        }

        Ok(MutationOutcome::Applied { files })
    }
}

/// Install the fixed FOSSA scan workflow
///
/// Creates `.github/workflows` if needed and unconditionally overwrites
/// `link_checker.yml` with the document from [`WorkflowDocument::fossa_scan`].
pub struct EnableFossaWorkflow;

impl Mutator for EnableFossaWorkflow {
    fn label(&self) -> &'static str {
        "enable"
    }

    fn commit_message(&self) -> &'static str {
        "Update GitHub Actions workflow for Fossa scan"
    }

    fn apply(&self, mirror: &Path) -> Result<MutationOutcome> {
        let dir = workflow_dir(mirror);
        std::fs::create_dir_all(&dir).map_err(Error::Io)?;

        let yaml = serde_yaml::to_string(&WorkflowDocument::fossa_scan())
            .map_err(|e| Error::Other(format!("Failed to serialize workflow: {}", e)))?;

        let file = dir.join(FOSSA_WORKFLOW_FILE);
        std::fs::write(&file, yaml).map_err(Error::Io)?;
        debug!(file = %file.display(), "Installed workflow");

        Ok(MutationOutcome::Applied { files: 1 })
    }
}

/// A GitHub Actions workflow document
///
/// Field order is the serialization order: `on`, `name`, `jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub on: Triggers,
    pub name: String,
    pub jobs: Jobs,
}

/// Workflow trigger block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triggers {
    pub push: PushTrigger,
    /// Serializes as `workflow_dispatch: null`, enabling manual runs
    pub workflow_dispatch: Option<()>,
}

/// Branch filter for push triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushTrigger {
    pub branches: Vec<String>,
}

/// The jobs block; this workflow has exactly one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jobs {
    #[serde(rename = "fossa-scan")]
    pub fossa_scan: Job,
}

/// A single workflow job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    pub steps: Vec<Step>,
}

/// A workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub uses: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with: Option<StepWith>,
}

/// Step inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepWith {
    #[serde(rename = "api-key")]
    pub api_key: String,
}

impl WorkflowDocument {
    /// The fixed FOSSA scan workflow installed by the enable sweep
    pub fn fossa_scan() -> Self {
        Self {
            on: Triggers {
                push: PushTrigger {
                    branches: vec!["**".to_string()],
                },
                workflow_dispatch: None,
            },
            name: "GH Action Bulk On-boarder".to_string(),
            jobs: Jobs {
                fossa_scan: Job {
                    runs_on: "ubuntu-latest".to_string(),
                    steps: vec![
                        Step {
                            uses: "actions/checkout@v3".to_string(),
                            with: None,
                        },
                        Step {
                            uses: "fossas/fossa-action@main".to_string(),
                            with: Some(StepWith {
                                api_key: "${{secrets.fossaApiKey}}".to_string(),
                            }),
                        },
                    ],
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_without_workflow_dir_is_noop() {
        let mirror = tempfile::tempdir().unwrap();

        let outcome = DisableWorkflows.apply(mirror.path()).unwrap();
        assert_eq!(outcome, MutationOutcome::Skipped);
        assert!(!mirror.path().join(".github").exists());
    }

    #[test]
    fn test_disable_overwrites_direct_files_only() {
        let mirror = tempfile::tempdir().unwrap();
        let dir = workflow_dir(mirror.path());
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("ci.yml"), "name: CI\n").unwrap();
        std::fs::write(dir.join("release.yml"), "name: Release\n").unwrap();
        std::fs::write(dir.join("nested").join("kept.yml"), "name: Kept\n").unwrap();

        let outcome = DisableWorkflows.apply(mirror.path()).unwrap();
        assert_eq!(outcome, MutationOutcome::Applied { files: 2 });

        let ci = std::fs::read_to_string(dir.join("ci.yml")).unwrap();
        let release = std::fs::read_to_string(dir.join("release.yml")).unwrap();
        assert_eq!(ci, DISABLED_MARKER);
        assert_eq!(release, DISABLED_MARKER);

        // Subdirectory contents are untouched
        let kept = std::fs::read_to_string(dir.join("nested").join("kept.yml")).unwrap();
        assert_eq!(kept, "name: Kept\n");
    }

    #[test]
    fn test_disable_is_idempotent() {
        let mirror = tempfile::tempdir().unwrap();
        let dir = workflow_dir(mirror.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("ci.yml"), "name: CI\n").unwrap();

        DisableWorkflows.apply(mirror.path()).unwrap();
        let first = std::fs::read_to_string(dir.join("ci.yml")).unwrap();

        DisableWorkflows.apply(mirror.path()).unwrap();
        let second = std::fs::read_to_string(dir.join("ci.yml")).unwrap();

        assert_eq!(first, DISABLED_MARKER);
        assert_eq!(first, second);
    }

    #[test]
    fn test_enable_creates_directory_and_file() {
        let mirror = tempfile::tempdir().unwrap();

        let outcome = EnableFossaWorkflow.apply(mirror.path()).unwrap();
        assert_eq!(outcome, MutationOutcome::Applied { files: 1 });

        let dir = workflow_dir(mirror.path());
        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(dir.join(FOSSA_WORKFLOW_FILE).is_file());
    }

    #[test]
    fn test_enable_overwrites_existing_file() {
        let mirror = tempfile::tempdir().unwrap();
        let dir = workflow_dir(mirror.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(FOSSA_WORKFLOW_FILE), "name: Old\n").unwrap();

        EnableFossaWorkflow.apply(mirror.path()).unwrap();

        let yaml = std::fs::read_to_string(dir.join(FOSSA_WORKFLOW_FILE)).unwrap();
        let parsed: WorkflowDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, WorkflowDocument::fossa_scan());
    }

    #[test]
    fn test_workflow_document_round_trip() {
        let doc = WorkflowDocument::fossa_scan();
        let yaml = serde_yaml::to_string(&doc).unwrap();
        let parsed: WorkflowDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_workflow_document_structure() {
        let doc = WorkflowDocument::fossa_scan();
        assert_eq!(doc.on.push.branches, vec!["**"]);
        assert!(doc.on.workflow_dispatch.is_none());
        assert_eq!(doc.name, "GH Action Bulk On-boarder");

        let job = &doc.jobs.fossa_scan;
        assert_eq!(job.runs_on, "ubuntu-latest");
        assert_eq!(job.steps.len(), 2);
        assert_eq!(job.steps[0].uses, "actions/checkout@v3");
        assert!(job.steps[0].with.is_none());
        assert_eq!(job.steps[1].uses, "fossas/fossa-action@main");
        assert_eq!(
            job.steps[1].with.as_ref().unwrap().api_key,
            "${{secrets.fossaApiKey}}"
        );
    }

    #[test]
    fn test_workflow_yaml_key_order() {
        let yaml = serde_yaml::to_string(&WorkflowDocument::fossa_scan()).unwrap();

        assert!(yaml.starts_with("on:"));
        let name_at = yaml.find("\nname:").unwrap();
        let jobs_at = yaml.find("\njobs:").unwrap();
        assert!(name_at < jobs_at);

        // Manual trigger survives serialization as an explicit null
        assert!(yaml.contains("workflow_dispatch: null"));
    }
}
