//! Response shapes for the hosting API, keeping only the fields we use.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A published release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
}

/// A pull request. `merged_at` is null until the pull request is merged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatestRelease {
    pub tag_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_deserialize_ignores_extra_fields() {
        let json = r#"{
            "id": 1,
            "tag_name": "v2.3.0",
            "name": "Release 2.3.0",
            "draft": false,
            "created_at": "2024-01-01T12:00:00Z",
            "published_at": "2024-01-01T12:05:00Z"
        }"#;

        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v2.3.0");
        assert_eq!(release.created_at.timestamp(), 1_704_110_400);
    }

    #[test]
    fn test_pull_request_deserialize_merged() {
        let json = r#"{
            "number": 42,
            "state": "closed",
            "created_at": "2024-01-01T00:00:00Z",
            "merged_at": "2024-01-03T00:00:00Z"
        }"#;

        let pr: PullRequest = serde_json::from_str(json).unwrap();
        assert_eq!(pr.number, 42);
        assert_eq!(pr.merged_at.map(|t| t.timestamp()), Some(1_704_240_000));
    }

    #[test]
    fn test_pull_request_deserialize_unmerged() {
        let json = r#"{
            "number": 7,
            "created_at": "2024-01-01T00:00:00Z",
            "merged_at": null
        }"#;

        let pr: PullRequest = serde_json::from_str(json).unwrap();
        assert!(pr.merged_at.is_none());
    }

    #[test]
    fn test_pull_request_deserialize_missing_merged_at() {
        let json = r#"{ "number": 7, "created_at": "2024-01-01T00:00:00Z" }"#;
        let pr: PullRequest = serde_json::from_str(json).unwrap();
        assert!(pr.merged_at.is_none());
    }

    #[test]
    fn test_latest_release_deserialize() {
        let json = r#"{ "tag_name": "v1.0.0", "created_at": "2024-01-01T00:00:00Z" }"#;
        let latest: LatestRelease = serde_json::from_str(json).unwrap();
        assert_eq!(latest.tag_name, "v1.0.0");
    }
}
