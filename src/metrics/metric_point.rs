use crate::hosting::RepoSpec;
use core::fmt;
use strum::{AsRefStr, Display};

/// How the backend aggregates a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MetricKind {
    Count,
    Gauge,
}

/// Ordered `key:value` tags. Always starts with the repository tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet(Vec<String>);

impl TagSet {
    #[must_use]
    pub fn for_repo(repo: &RepoSpec) -> Self {
        Self(vec![format!("repo:{repo}")])
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.0.push(format!("{key}:{value}"));
        self
    }

    /// Append a tag that is already in `key:value` form.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.0.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.0.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A single observation destined for a series submission.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub name: &'static str,
    pub kind: MetricKind,
    pub value: f64,
    pub timestamp: i64,
    pub tags: TagSet,
}
