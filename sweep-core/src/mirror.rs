//! Local mirror management: clone, publish, guaranteed cleanup
//!
//! A [`Mirror`] is a transient working copy of one remote repository, cloned
//! to `{local_root}/{repo name}` for the duration of a single mutation. The
//! directory is removed when the mirror is dropped, so cleanup runs whether
//! the pipeline succeeded, errored, or unwound.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};
use url::Url;

use crate::{Error, Result};

/// Result of publishing a mutated mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Changes were committed and pushed to the remote
    Published,
    /// Staging produced no changes; commit and push were not attempted
    SkippedNoChanges,
}

/// Build the credentialed HTTPS clone URL for a repository
///
/// The token is set as the userinfo component of
/// `https://github.com/{owner}/{repo}.git`.
pub fn clone_url(token: &str, full_name: &str) -> Result<String> {
    let (owner, name) = split_full_name(full_name)?;

    let mut url = Url::parse(&format!("https://github.com/{}/{}.git", owner, name))
        .map_err(|e| Error::Config(format!("Invalid repository name {}: {}", full_name, e)))?;
    url.set_username(token)
        .map_err(|_| Error::Config(format!("Cannot embed token in URL for {}", full_name)))?;

    Ok(url.to_string())
}

/// Split an `owner/repo` full name
fn split_full_name(full_name: &str) -> Result<(&str, &str)> {
    full_name
        .split_once('/')
        .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
        .ok_or_else(|| {
            Error::Config(format!(
                "Invalid repository name: {}. Expected owner/repo",
                full_name
            ))
        })
}

/// A transient local working copy of one remote repository
///
/// Dropping the mirror removes its directory recursively. A removal failure
/// is logged at warn level and otherwise swallowed, since `Drop` cannot
/// propagate errors.
pub struct Mirror {
    path: PathBuf,
    repo: String,
    /// Userinfo component of the remote URL, scrubbed from subprocess stderr
    secret: Option<String>,
}

impl Mirror {
    /// Clone a repository to `{local_root}/{repo name}`
    ///
    /// A leftover directory from a previous run is removed first, so at most
    /// one mirror per repository name exists on disk. A failed clone leaves
    /// no directory behind: the guard is constructed before the subprocess
    /// runs, and the error path drops it.
    pub fn establish(local_root: &Path, full_name: &str, clone_url: &str) -> Result<Self> {
        let (_, name) = split_full_name(full_name)?;
        let path = local_root.join(name);

        std::fs::create_dir_all(local_root).map_err(Error::Io)?;

        if path.exists() {
            warn!(path = %path.display(), "Removing leftover mirror directory");
            std::fs::remove_dir_all(&path).map_err(Error::Io)?;
        }

        let secret = Url::parse(clone_url)
            .ok()
            .map(|u| u.username().to_string())
            .filter(|u| !u.is_empty());

        let mirror = Self {
            path,
            repo: full_name.to_string(),
            secret,
        };

        debug!(repo = %mirror.repo, path = %mirror.path.display(), "Cloning repository");

        let output = Command::new("git")
            .arg("clone")
            .arg(clone_url)
            .arg(&mirror.path)
            .output()
            .map_err(|e| Error::Other(format!("Failed to run git clone: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git {
                operation: "clone",
                detail: mirror.scrub(stderr.trim()),
            });
        }

        Ok(mirror)
    }

    /// Path to the mirror's working tree
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full name of the mirrored repository
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Stage everything, then commit and push with the given message
    ///
    /// If staging produces no changes (the mutation was a no-op), commit and
    /// push are skipped and [`PublishOutcome::SkippedNoChanges`] is returned
    /// instead of letting an empty commit fail.
    pub fn publish(&self, message: &str) -> Result<PublishOutcome> {
        self.run_git("add", &["add", "."])?;

        if !self.has_staged_changes()? {
            debug!(repo = %self.repo, "Nothing staged, skipping commit and push");
            return Ok(PublishOutcome::SkippedNoChanges);
        }

        self.run_git("commit", &["commit", "-m", message])?;
        self.run_git("push", &["push"])?;

        Ok(PublishOutcome::Published)
    }

    /// Check whether the index differs from HEAD
    pub fn has_staged_changes(&self) -> Result<bool> {
        let repo = git2::Repository::open(&self.path)?;

        // A freshly initialized repository has an unborn HEAD; diff the
        // index against the empty tree in that case.
        let head_tree = match repo.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(_) => None,
        };

        let diff = repo.diff_tree_to_index(head_tree.as_ref(), None, None)?;
        Ok(diff.deltas().count() > 0)
    }

    /// Run a git subcommand inside the mirror, failing on non-zero exit
    fn run_git(&self, operation: &'static str, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .map_err(|e| Error::Other(format!("Failed to run git {}: {}", operation, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git {
                operation,
                detail: self.scrub(stderr.trim()),
            });
        }

        Ok(())
    }

    /// Redact the embedded credential from subprocess output
    ///
    /// git error messages quote the remote URL, which carries the token as
    /// userinfo.
    fn scrub(&self, text: &str) -> String {
        match &self.secret {
            Some(secret) => text.replace(secret.as_str(), "<token>"),
            None => text.to_string(),
        }
    }
}

impl std::fmt::Debug for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror")
            .field("repo", &self.repo)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Drop for Mirror {
    fn drop(&mut self) {
        debug!(repo = %self.repo, path = %self.path.display(), "Removing local mirror");

        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    repo = %self.repo,
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove mirror directory"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_mirror(path: PathBuf) -> Mirror {
        Mirror {
            path,
            repo: "org/repo".to_string(),
            secret: Some("tok123".to_string()),
        }
    }

    #[test]
    fn test_clone_url_embeds_token() {
        let url = clone_url("tok123", "org/repo").unwrap();
        assert_eq!(url, "https://tok123@github.com/org/repo.git");
    }

    #[test]
    fn test_clone_url_rejects_bare_name() {
        assert!(clone_url("tok123", "norepo").is_err());
        assert!(clone_url("tok123", "/repo").is_err());
        assert!(clone_url("tok123", "org/").is_err());
    }

    #[test]
    fn test_scrub_redacts_token() {
        let mirror = test_mirror(PathBuf::from("/nonexistent/gha-sweep-test"));
        let scrubbed =
            mirror.scrub("fatal: unable to access 'https://tok123@github.com/org/repo.git/'");
        assert!(!scrubbed.contains("tok123"));
        assert!(scrubbed.contains("<token>"));
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("repo");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("file.txt"), "content").unwrap();

        drop(test_mirror(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_tolerates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("never-created");

        // Must not panic
        drop(test_mirror(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_clone_leaves_no_directory() {
        let root = tempfile::tempdir().unwrap();

        // Nothing listens on port 1, so the clone fails immediately
        let result = Mirror::establish(
            root.path(),
            "org/repo",
            "https://tok123@127.0.0.1:1/org/repo.git",
        );

        assert!(result.is_err());
        assert!(!root.path().join("repo").exists());
        // The credential never appears in the error text
        assert!(!result.unwrap_err().to_string().contains("tok123"));
    }

    #[test]
    fn test_establish_rejects_bare_name() {
        let root = tempfile::tempdir().unwrap();
        let result = Mirror::establish(root.path(), "norepo", "https://github.com/x/y.git");
        assert!(result.is_err());
    }

    #[test]
    fn test_has_staged_changes() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("repo");
        let repo = git2::Repository::init(&path).unwrap();

        let mirror = test_mirror(path.clone());
        assert!(!mirror.has_staged_changes().unwrap());

        std::fs::write(path.join("file.txt"), "content").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("file.txt")).unwrap();
        index.write().unwrap();

        assert!(mirror.has_staged_changes().unwrap());
    }
}
