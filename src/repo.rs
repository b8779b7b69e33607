//! The read-only view of the git repository that context construction needs.
//!
//! Reading git itself is left to the caller; anything that can report the
//! active branch and the tag names can back a [`RuntimeContext`](crate::RuntimeContext).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("HEAD is detached; releases must be made from a branch")]
    DetachedHead,

    #[error("{0}")]
    Other(String),
}

pub trait RepositoryHandle {
    /// Name of the checked-out branch.
    fn active_branch(&self) -> Result<String, RepositoryError>;

    /// Names of every tag in the repository.
    fn tag_names(&self) -> Vec<String>;
}

/// Repository state captured up front, e.g. by a caller that already ran git.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    /// `None` for a detached HEAD.
    pub branch: Option<String>,
    pub tags: Vec<String>,
}

impl RepositorySnapshot {
    pub fn on_branch(branch: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
            tags: Vec::new(),
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

impl RepositoryHandle for RepositorySnapshot {
    fn active_branch(&self) -> Result<String, RepositoryError> {
        self.branch.clone().ok_or(RepositoryError::DetachedHead)
    }

    fn tag_names(&self) -> Vec<String> {
        self.tags.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_branch_and_tags() {
        let repo = RepositorySnapshot::on_branch("main").with_tags(["v1.0.0", "v1.1.0"]);
        assert_eq!(repo.active_branch().unwrap(), "main");
        assert_eq!(repo.tag_names(), vec!["v1.0.0", "v1.1.0"]);
    }

    #[test]
    fn detached_snapshot_has_no_branch() {
        assert_eq!(
            RepositorySnapshot::detached().active_branch(),
            Err(RepositoryError::DetachedHead)
        );
    }
}
