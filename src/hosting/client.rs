//! GitHub API client
//!
//! Minimal client for the three reads a reporting run needs: the latest
//! release, the pull-request list, and the release history. Listings are
//! read as a single page.

use super::model::{LatestRelease, PullRequest, Release};
use super::RepoSpec;
use crate::error::{ReportError, ReportResult, Upstream};
use crate::http;
use core::time::Duration;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use url::Url;

const LOG_TARGET: &str = "   hosting";

/// Tag reported when a repository has no releases yet.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Which pull requests the listing asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PullRequestState {
    #[default]
    Open,
    Closed,
    All,
}

/// Result of a hosting API call
enum ApiResult<T> {
    /// Request succeeded
    Success(T),

    /// The requested resource was not found (404)
    NotFound,
}

/// Hosting API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Create a client that authenticates every request with `token`.
    pub fn new(token: &str, base_url: Url, timeout: Duration) -> ReportResult<Self> {
        let mut auth_val = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_invalid| ReportError::InvalidInput("source-control token contains invalid characters".into()))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert(AUTHORIZATION, auth_val);

        Ok(Self {
            client: http::build_client(headers, timeout)?,
            base_url,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Tag name of the latest release, or [`UNKNOWN_VERSION`] if the repository has none.
    pub async fn fetch_latest_release(&self, repo: &RepoSpec) -> ReportResult<String> {
        let url = http::endpoint(&self.base_url, &["repos", repo.owner(), repo.repo(), "releases", "latest"])?;
        let operation = format!("fetching latest release for '{repo}'");

        match self.get_json::<LatestRelease>(url, &operation).await? {
            ApiResult::Success(latest) => {
                log::info!(target: LOG_TARGET, "Latest release of '{repo}' is {}", latest.tag_name);
                Ok(latest.tag_name)
            }
            ApiResult::NotFound => {
                log::info!(target: LOG_TARGET, "'{repo}' has no releases, reporting version as {UNKNOWN_VERSION}");
                Ok(UNKNOWN_VERSION.to_string())
            }
        }
    }

    /// First page of pull requests in the given state.
    pub async fn fetch_pull_requests(&self, repo: &RepoSpec, state: PullRequestState) -> ReportResult<Vec<PullRequest>> {
        let mut url = http::endpoint(&self.base_url, &["repos", repo.owner(), repo.repo(), "pulls"])?;
        let _ = url.query_pairs_mut().append_pair("state", state.as_ref());
        let operation = format!("fetching {state} pull requests for '{repo}'");

        let pulls: Vec<PullRequest> = self.get_found(url, &operation).await?;
        log::debug!(target: LOG_TARGET, "Fetched {} {state} pull request(s) for '{repo}'", pulls.len());
        Ok(pulls)
    }

    /// First page of releases, newest first as returned by the API.
    pub async fn fetch_release_history(&self, repo: &RepoSpec) -> ReportResult<Vec<Release>> {
        let url = http::endpoint(&self.base_url, &["repos", repo.owner(), repo.repo(), "releases"])?;
        let operation = format!("fetching release history for '{repo}'");

        let releases: Vec<Release> = self.get_found(url, &operation).await?;
        log::debug!(target: LOG_TARGET, "Fetched {} release(s) for '{repo}'", releases.len());
        Ok(releases)
    }

    /// Like [`Self::get_json`], but a missing resource is an error.
    async fn get_found<T: DeserializeOwned>(&self, url: Url, operation: &str) -> ReportResult<T> {
        match self.get_json(url, operation).await? {
            ApiResult::Success(data) => Ok(data),
            ApiResult::NotFound => Err(ReportError::unavailable(Upstream::Hosting, operation, "repository not found")),
        }
    }

    /// Make an API call and classify the result
    async fn get_json<T: DeserializeOwned>(&self, url: Url, operation: &str) -> ReportResult<ApiResult<T>> {
        log::debug!(target: LOG_TARGET, "GET {url}");
        let resp = http::send(self.client.get(url), Upstream::Hosting, operation).await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(ApiResult::NotFound);
        }

        let resp = http::require_success(resp, Upstream::Hosting, operation)?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| ReportError::unavailable(Upstream::Hosting, operation, e))?;

        serde_json::from_slice(&body)
            .map(ApiResult::Success)
            .map_err(|e| ReportError::malformed(Upstream::Hosting, operation, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::new("test_token", Url::parse("https://api.github.com").unwrap(), Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn test_client_new_keeps_base_url() {
        assert_eq!(client().base_url().as_str(), "https://api.github.com/");
    }

    #[test]
    fn test_client_rejects_token_with_newline() {
        let err = Client::new("bad\ntoken", Url::parse("https://api.github.com").unwrap(), Duration::from_secs(30)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));
    }

    #[test]
    fn test_pull_request_state_strings() {
        assert_eq!(PullRequestState::Open.as_ref(), "open");
        assert_eq!(PullRequestState::Closed.to_string(), "closed");
        assert_eq!(PullRequestState::default(), PullRequestState::Open);

        let state: PullRequestState = serde_json::from_str(r#""all""#).unwrap();
        assert_eq!(state, PullRequestState::All);
    }
}
