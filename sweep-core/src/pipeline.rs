//! The per-repository sweep pipeline
//!
//! Repositories are processed strictly sequentially: clone, mutate,
//! publish, cleanup, then a fixed pause before the next one. A failure in
//! any stage is logged with the repository name and the batch continues;
//! nothing is retried.

use tracing::{debug, error, info};

use crate::config::SweepConfig;
use crate::mirror::{self, Mirror, PublishOutcome};
use crate::mutate::{MutationOutcome, Mutator};
use crate::Result;

/// Outcome of processing one repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOutcome {
    /// The mutation was committed and pushed
    Updated,
    /// The mutation produced no changes; nothing was pushed
    SkippedNoChanges,
    /// Some stage failed; the repository was left untouched upstream
    Failed,
}

impl RepoOutcome {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            RepoOutcome::Updated => "updated",
            RepoOutcome::SkippedNoChanges => "no changes",
            RepoOutcome::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RepoOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Tally of a sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Repositories updated and pushed
    pub updated: usize,
    /// Repositories with nothing to change
    pub skipped: usize,
    /// Repositories where some stage failed
    pub failed: usize,
}

impl SweepSummary {
    /// Record one repository outcome
    pub fn record(&mut self, outcome: RepoOutcome) {
        match outcome {
            RepoOutcome::Updated => self.updated += 1,
            RepoOutcome::SkippedNoChanges => self.skipped += 1,
            RepoOutcome::Failed => self.failed += 1,
        }
    }

    /// Total repositories processed
    pub fn total(&self) -> usize {
        self.updated + self.skipped + self.failed
    }
}

/// Run a sweep over the given repositories
///
/// Each entry is an `owner/repo` full name, processed in listing order. The
/// configured delay is inserted between repositories to stay under API rate
/// limits. Per-repository failures are logged and never abort the batch.
pub async fn run_sweep(
    config: &SweepConfig,
    token: &str,
    repos: &[String],
    mutator: &dyn Mutator,
) -> SweepSummary {
    let mut summary = SweepSummary::default();

    info!(
        sweep = mutator.label(),
        count = repos.len(),
        local_root = %config.local_root.display(),
        "Starting sweep"
    );

    for (index, full_name) in repos.iter().enumerate() {
        let outcome = match process_repository(config, token, full_name, mutator) {
            Ok(PublishOutcome::Published) => {
                info!(repo = %full_name, "Successfully updated workflows");
                RepoOutcome::Updated
            }
            Ok(PublishOutcome::SkippedNoChanges) => {
                info!(repo = %full_name, "No workflow changes to publish");
                RepoOutcome::SkippedNoChanges
            }
            Err(e) => {
                error!(repo = %full_name, error = %e, "Failed to update workflows");
                RepoOutcome::Failed
            }
        };
        summary.record(outcome);

        if index + 1 < repos.len() {
            tokio::time::sleep(config.delay).await;
        }
    }

    info!(
        updated = summary.updated,
        skipped = summary.skipped,
        failed = summary.failed,
        "Sweep complete"
    );

    summary
}

/// Process a single repository: clone, mutate, publish
///
/// The mirror directory is removed when this function returns, on the error
/// path included, via the mirror guard's `Drop`.
pub fn process_repository(
    config: &SweepConfig,
    token: &str,
    full_name: &str,
    mutator: &dyn Mutator,
) -> Result<PublishOutcome> {
    let url = mirror::clone_url(token, full_name)?;
    let mirror = Mirror::establish(&config.local_root, full_name, &url)?;

    match mutator.apply(mirror.path())? {
        MutationOutcome::Skipped => {
            debug!(repo = %full_name, "Nothing to mutate");
            Ok(PublishOutcome::SkippedNoChanges)
        }
        MutationOutcome::Applied { files } => {
            debug!(repo = %full_name, files, "Mutation applied");
            mirror.publish(mutator.commit_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_record() {
        let mut summary = SweepSummary::default();
        summary.record(RepoOutcome::Updated);
        summary.record(RepoOutcome::Updated);
        summary.record(RepoOutcome::SkippedNoChanges);
        summary.record(RepoOutcome::Failed);

        assert_eq!(summary.updated, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_outcome_description() {
        assert_eq!(RepoOutcome::Updated.to_string(), "updated");
        assert_eq!(RepoOutcome::SkippedNoChanges.to_string(), "no changes");
        assert_eq!(RepoOutcome::Failed.to_string(), "failed");
    }
}
