use crate::error::{ReportError, ReportResult};
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use std::sync::Arc;

/// A repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSpec {
    owner: Arc<str>,
    repo: Arc<str>,
}

impl RepoSpec {
    pub fn parse(s: &str) -> ReportResult<Self> {
        let s = s.trim();
        let Some((owner, repo)) = s.split_once('/') else {
            return Err(ReportError::InvalidInput(format!("repository '{s}' is not in owner/name form")));
        };

        let repo = repo.trim_end_matches(".git");
        if owner.is_empty() || repo.is_empty() {
            return Err(ReportError::InvalidInput(format!("repository '{s}' has an empty owner or name")));
        }

        if repo.contains('/') {
            return Err(ReportError::InvalidInput(format!("repository '{s}' has more than two path segments")));
        }

        Ok(Self {
            owner: Arc::from(owner),
            repo: Arc::from(repo),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepoSpec {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        Self::parse(s)
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
