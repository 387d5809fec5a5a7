//! Shared HTTP plumbing for the hosting and metrics clients.
//!
//! Requests are sent exactly once. Every client carries a request timeout so
//! a hung upstream fails the run instead of blocking it.

use crate::error::{ReportError, ReportResult, Upstream};
use core::time::Duration;
use reqwest::header::HeaderMap;
use url::Url;

const USER_AGENT: &str = concat!("ci-metrics/", env!("CARGO_PKG_VERSION"));

/// Build a client with the given default headers and timeout.
pub fn build_client(headers: HeaderMap, timeout: Duration) -> ReportResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| ReportError::InvalidInput(format!("could not build HTTP client: {e}")))
}

/// Append path segments to a base URL, percent-encoding each segment.
pub fn endpoint(base: &Url, segments: &[&str]) -> ReportResult<Url> {
    let mut url = base.clone();

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| ReportError::InvalidInput(format!("'{base}' cannot be used as a base URL")))?;
        let _ = path.pop_if_empty().extend(segments);
    }

    Ok(url)
}

/// Send a request once, mapping transport failures to [`ReportError::UpstreamUnavailable`].
pub async fn send(request: reqwest::RequestBuilder, upstream: Upstream, operation: &str) -> ReportResult<reqwest::Response> {
    request.send().await.map_err(|e| {
        let reason = if e.is_timeout() {
            "request timed out".to_string()
        } else {
            e.to_string()
        };
        ReportError::unavailable(upstream, operation, reason)
    })
}

/// Reject any non-success status as [`ReportError::UpstreamUnavailable`].
pub fn require_success(resp: reqwest::Response, upstream: Upstream, operation: &str) -> ReportResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    Err(ReportError::unavailable(upstream, operation, format!("HTTP {status}")))
}
