//! Tag operations

use std::collections::HashMap;

use git2::{ObjectType, Oid, Signature, Sort};
use tracing::{debug, info, instrument};

use crate::history::TagHistory;
use crate::repository::{GitRepo, Result};
use crate::types::TagInfo;
use proman_core::error::GitError;

impl GitRepo {
    /// Get all tags with the commit they point to
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();
        for name in self.repo.tag_names(None)?.iter().flatten() {
            if let Some(tag) = self.find_tag(name)? {
                tags.push(tag);
            }
        }
        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }

    /// Find a specific tag by name. Tags of trees or blobs are ignored.
    pub fn find_tag(&self, name: &str) -> Result<Option<TagInfo>> {
        let Some(reference) = self.tag_reference(name)? else {
            return Ok(None);
        };

        match reference.peel(ObjectType::Any)?.into_commit() {
            Ok(target) => Ok(Some(TagInfo::new(name, target.id().to_string()))),
            Err(object) => {
                debug!(name, kind = ?object.kind(), "skipping tag that does not point at a commit");
                Ok(None)
            }
        }
    }

    fn tag_reference(&self, name: &str) -> Result<Option<git2::Reference<'_>>> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(reference) => Ok(Some(reference)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Create a tag on `target`, annotated when a message is given
    #[instrument(skip(self), fields(annotated = message.is_some()))]
    pub fn create_tag(&self, name: &str, target: &str, message: Option<&str>) -> Result<TagInfo> {
        if self.tag_reference(name)?.is_some() {
            return Err(GitError::TagExists(name.to_string()));
        }

        let commit = self.resolve_commit(target)?;

        if let Some(msg) = message {
            let sig = self
                .repo
                .signature()
                .or_else(|_| Signature::now("proman", "proman@users.noreply.github.com"))?;
            self.repo.tag(name, commit.as_object(), &sig, msg, false)?;
        } else {
            self.repo.tag_lightweight(name, commit.as_object(), false)?;
        }

        info!(name, commit = %commit.id(), "created tag");
        Ok(TagInfo::new(name, commit.id().to_string()))
    }

    fn tags_by_commit(&self) -> Result<HashMap<Oid, Vec<String>>> {
        let mut by_commit: HashMap<Oid, Vec<String>> = HashMap::new();
        for tag in self.tags()? {
            let oid = Oid::from_str(&tag.commit_hash)?;
            by_commit.entry(oid).or_default().push(tag.name);
        }
        for names in by_commit.values_mut() {
            names.sort();
        }
        Ok(by_commit)
    }
}

impl TagHistory for GitRepo {
    #[instrument(skip(self))]
    fn tag_groups(&self, reference: &str) -> Result<Vec<Vec<String>>> {
        let mut by_commit = self.tags_by_commit()?;
        let start = self.resolve_commit(reference)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(start.id())?;

        let mut groups = Vec::new();
        for oid in revwalk {
            if let Some(names) = by_commit.remove(&oid?) {
                groups.push(names);
            }
        }

        debug!(groups = groups.len(), "collected tag groups");
        Ok(groups)
    }

    fn distance(&self, tag: &str, reference: &str) -> Result<u64> {
        let tagged = self.resolve_commit(tag)?.id();
        let head = self.resolve_commit(reference)?.id();
        let (ahead, _behind) = self.repo.graph_ahead_behind(head, tagged)?;
        Ok(ahead as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::commit_file;
    use git2::Repository;
    use tempfile::TempDir;

    fn setup_repo_with_tags() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let raw = Repository::init(temp.path()).unwrap();

        let first = commit_file(&raw, temp.path(), "a.txt", "chore: init");
        let commit = raw.find_commit(first).unwrap();
        raw.tag_lightweight("v1.0.0", commit.as_object(), false).unwrap();

        let second = commit_file(&raw, temp.path(), "b.txt", "feat: add b");
        let commit = raw.find_commit(second).unwrap();
        raw.tag_lightweight("v2.0.0", commit.as_object(), false).unwrap();
        raw.tag_lightweight("other", commit.as_object(), false).unwrap();

        commit_file(&raw, temp.path(), "c.txt", "fix: c");
        commit_file(&raw, temp.path(), "d.txt", "fix: d");

        let repo = GitRepo::open(temp.path()).unwrap();
        (temp, repo)
    }

    #[test]
    fn test_list_tags() {
        let (_temp, repo) = setup_repo_with_tags();
        let mut names: Vec<String> = repo.tags().unwrap().into_iter().map(|t| t.name).collect();
        names.sort();
        assert_eq!(names, vec!["other", "v1.0.0", "v2.0.0"]);
    }

    #[test]
    fn test_tag_groups_newest_first() {
        let (_temp, repo) = setup_repo_with_tags();
        let groups = repo.tag_groups("HEAD").unwrap();
        assert_eq!(
            groups,
            vec![
                vec!["other".to_string(), "v2.0.0".to_string()],
                vec!["v1.0.0".to_string()],
            ]
        );
    }

    #[test]
    fn test_distance() {
        let (_temp, repo) = setup_repo_with_tags();
        assert_eq!(repo.distance("v2.0.0", "HEAD").unwrap(), 2);
        assert_eq!(repo.distance("v1.0.0", "HEAD").unwrap(), 3);
        assert_eq!(repo.distance("v1.0.0", "v1.0.0").unwrap(), 0);
    }

    #[test]
    fn test_create_tag() {
        let (_temp, repo) = setup_repo_with_tags();
        let tag = repo.create_tag("v2.1.0", "HEAD", Some("Release 2.1.0")).unwrap();
        assert_eq!(tag.name, "v2.1.0");
        assert_eq!(repo.tag_groups("HEAD").unwrap()[0], vec!["v2.1.0".to_string()]);
    }

    #[test]
    fn test_tags_ignore_non_commit_targets() {
        let (temp, repo) = setup_repo_with_tags();
        let raw = Repository::open(temp.path()).unwrap();
        let tree = raw.head().unwrap().peel_to_tree().unwrap();
        raw.tag_lightweight("v9.9.9", tree.as_object(), false).unwrap();

        assert!(repo.find_tag("v9.9.9").unwrap().is_none());
        assert_eq!(repo.tags().unwrap().len(), 3);
        assert_eq!(repo.tag_groups("HEAD").unwrap().len(), 2);
        assert!(matches!(
            repo.create_tag("v9.9.9", "HEAD", None),
            Err(GitError::TagExists(_))
        ));
    }

    #[test]
    fn test_tag_already_exists() {
        let (_temp, repo) = setup_repo_with_tags();
        let result = repo.create_tag("v1.0.0", "HEAD", None);
        assert!(matches!(result, Err(GitError::TagExists(_))));
    }
}
