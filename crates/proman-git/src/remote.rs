//! Remote operations

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::repository::{GitRepo, Result};
use proman_core::error::GitError;

impl GitRepo {
    /// Get list of remote names
    pub fn remotes(&self) -> Result<Vec<String>> {
        let remotes = self.repo.remotes()?;
        Ok(remotes
            .iter()
            .filter_map(|r| r.map(|s| s.to_string()))
            .collect())
    }

    /// Whether the remote advertises a ref pointing at `sha` (`git ls-remote`)
    pub fn remote_has_commit(&self, remote: &str, sha: &str) -> Result<bool> {
        let output = Command::new("git")
            .args(["ls-remote", remote])
            .current_dir(self.path())
            .output()
            .map_err(|e| GitError::CommandFailed {
                command: "ls-remote".to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: "ls-remote".to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(listing
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .any(|advertised| advertised == sha))
    }

    /// Poll the remote until `sha` is visible, at most `attempts` times
    #[instrument(skip(self))]
    pub fn wait_for_remote_commit(
        &self,
        remote: &str,
        sha: &str,
        attempts: u32,
        interval: Duration,
    ) -> Result<()> {
        wait_for_commit_with(remote, sha, attempts, interval, || {
            self.remote_has_commit(remote, sha)
        })
    }
}

/// Bounded polling loop behind [`GitRepo::wait_for_remote_commit`].
///
/// `probe` reports whether the commit is visible yet. Probe errors abort the
/// wait; exhausting `attempts` fails with [`GitError::CommitNotObserved`].
pub fn wait_for_commit_with<F>(
    remote: &str,
    sha: &str,
    attempts: u32,
    interval: Duration,
    mut probe: F,
) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    for attempt in 1..=attempts {
        if probe()? {
            info!(remote, sha, attempt, "commit observed on remote");
            return Ok(());
        }
        debug!(remote, sha, attempt, attempts, "commit not yet on remote");
        if attempt < attempts {
            std::thread::sleep(interval);
        }
    }

    warn!(remote, sha, attempts, "gave up waiting for commit");
    Err(GitError::CommitNotObserved {
        sha: sha.to_string(),
        remote: remote.to_string(),
        attempts,
    })
}

fn run_push(dir: &Path, args: &[&str]) -> Result<()> {
    let start = std::time::Instant::now();
    let output = Command::new("git")
        .arg("push")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| GitError::PushFailed(e.to_string()))?;

    info!(
        args = ?args,
        duration_ms = start.elapsed().as_millis(),
        success = output.status.success(),
        "git push (CLI)"
    );

    if output.status.success() {
        Ok(())
    } else {
        Err(GitError::PushFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

/// Push a tag using the git CLI
#[instrument(fields(dir = %dir.display()))]
pub fn git_push_tag(dir: &Path, remote: &str, tag: &str) -> Result<()> {
    let tag_ref = format!("refs/tags/{}", tag);
    run_push(dir, &[remote, tag_ref.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;
    use tempfile::TempDir;

    #[test]
    fn test_remotes_listed() {
        let temp = TempDir::new().unwrap();
        let raw = Repository::init(temp.path()).unwrap();
        assert!(GitRepo::open(temp.path()).unwrap().remotes().unwrap().is_empty());

        raw.remote("upstream", "https://example.com/acme/app.git").unwrap();
        let repo = GitRepo::open(temp.path()).unwrap();
        assert_eq!(repo.remotes().unwrap(), vec!["upstream".to_string()]);
    }

    #[test]
    fn test_wait_succeeds_when_commit_appears() {
        let mut calls = 0;
        let result = wait_for_commit_with("origin", "abc123", 5, Duration::ZERO, || {
            calls += 1;
            Ok(calls == 3)
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_wait_is_bounded() {
        let mut calls = 0;
        let result = wait_for_commit_with("origin", "abc123", 4, Duration::ZERO, || {
            calls += 1;
            Ok(false)
        });
        assert!(matches!(
            result,
            Err(GitError::CommitNotObserved { attempts: 4, .. })
        ));
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_probe_error_aborts_wait() {
        let result = wait_for_commit_with("origin", "abc123", 4, Duration::ZERO, || {
            Err(GitError::RemoteNotFound("origin".to_string()))
        });
        assert!(matches!(result, Err(GitError::RemoteNotFound(_))));
    }
}
