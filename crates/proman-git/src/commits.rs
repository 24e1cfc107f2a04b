//! Commit history operations

use chrono::{TimeZone, Utc};
use git2::Sort;
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

impl GitRepo {
    /// Commits reachable from `to` but not from `from`, newest first.
    ///
    /// Without `from` the whole history of `to` is returned.
    #[instrument(skip(self))]
    pub fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        let head = self.resolve_commit(to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head.id())?;
        if let Some(from) = from {
            revwalk.hide(self.resolve_commit(from)?.id())?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(self.commit_to_info(&commit)?);
        }

        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }

    fn commit_to_info(&self, commit: &git2::Commit<'_>) -> Result<CommitInfo> {
        let author = commit.author();
        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let files = diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| path.to_string_lossy().into_owned())
            .collect();

        Ok(CommitInfo::new(
            commit.id().to_string(),
            commit.message().unwrap_or("").trim_end(),
            author.name().unwrap_or("Unknown"),
            author.email().unwrap_or("unknown@example.com"),
            timestamp,
        )
        .with_files(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::commit_file;
    use git2::Repository;
    use tempfile::TempDir;

    #[test]
    fn test_commits_between() {
        let temp = TempDir::new().unwrap();
        let raw = Repository::init(temp.path()).unwrap();
        let first = commit_file(&raw, temp.path(), "a.txt", "chore: init");
        commit_file(&raw, temp.path(), "b.txt", "feat: add b");
        commit_file(&raw, temp.path(), "c.txt", "fix: repair c");

        let repo = crate::GitRepo::open(temp.path()).unwrap();
        let all = repo.commits_between(None, "HEAD").unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].summary(), "fix: repair c");
        assert_eq!(all[0].files, vec!["c.txt".to_string()]);

        let since = repo
            .commits_between(Some(&first.to_string()), "HEAD")
            .unwrap();
        let summaries: Vec<&str> = since.iter().map(|c| c.summary()).collect();
        assert_eq!(summaries, vec!["fix: repair c", "feat: add b"]);
    }
}
