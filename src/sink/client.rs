//! Datadog API client
//!
//! Submits series, events, and log records. The API key travels in the
//! `DD-API-KEY` header of every request. Nothing is retried.

use super::payload::{EventPayload, LogPayload, SeriesPayload};
use crate::error::{ReportError, ReportResult, Upstream};
use crate::http;
use crate::metrics::{BuildEvent, LogEntry, MetricPoint};
use core::time::Duration;
use futures_util::future::join_all;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

const LOG_TARGET: &str = "      sink";

const API_KEY_HEADER: &str = "dd-api-key";

/// Where each kind of submission is delivered.
#[derive(Debug, Clone)]
pub struct SinkEndpoints {
    pub series: Url,
    pub events: Url,
    pub logs: Url,
}

impl SinkEndpoints {
    /// Derive the standard endpoint paths from the API and log intake base URLs.
    pub fn new(metrics_api_url: &Url, logs_api_url: &Url) -> ReportResult<Self> {
        Ok(Self {
            series: http::endpoint(metrics_api_url, &["api", "v1", "series"])?,
            events: http::endpoint(metrics_api_url, &["api", "v1", "events"])?,
            logs: http::endpoint(logs_api_url, &["v1", "input"])?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SinkClient {
    client: reqwest::Client,
    endpoints: SinkEndpoints,
}

impl SinkClient {
    pub fn new(api_key: &str, endpoints: SinkEndpoints, timeout: Duration) -> ReportResult<Self> {
        let mut key_val = HeaderValue::from_str(api_key)
            .map_err(|_invalid| ReportError::InvalidInput("metrics API key contains invalid characters".into()))?;
        key_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert(HeaderName::from_static(API_KEY_HEADER), key_val);

        Ok(Self {
            client: http::build_client(headers, timeout)?,
            endpoints,
        })
    }

    /// Deliver `points` as one series submission.
    pub async fn submit_series(&self, points: &[MetricPoint]) -> ReportResult<()> {
        if points.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = points.iter().map(|p| p.name).collect();
        let operation = format!("submitting series [{}]", names.join(", "));
        self.post(&self.endpoints.series, &SeriesPayload::new(points), &operation).await?;

        log::info!(target: LOG_TARGET, "Submitted {} point(s): {}", points.len(), names.join(", "));
        Ok(())
    }

    /// Deliver each point in its own series submission, with at most
    /// `max_concurrent` requests in flight.
    ///
    /// Every submission is awaited before this returns, even after one fails.
    /// The first failure (in `points` order) is returned.
    pub async fn submit_series_each(&self, points: &[MetricPoint], max_concurrent: usize) -> ReportResult<usize> {
        let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));

        let submissions = points.iter().map(|point| {
            let permits = Arc::clone(&permits);
            async move {
                let Ok(_permit) = permits.acquire().await else {
                    return Err(ReportError::unavailable(Upstream::Metrics, "submitting series", "submission queue closed"));
                };
                self.submit_series(core::slice::from_ref(point)).await
            }
        });

        let results = join_all(submissions).await;
        let submitted = results.iter().filter(|r| r.is_ok()).count();

        if let Some(err) = results.into_iter().find_map(Result::err) {
            log::error!(target: LOG_TARGET, "{submitted} of {} point submission(s) succeeded", points.len());
            return Err(err);
        }

        Ok(submitted)
    }

    pub async fn submit_event(&self, event: &BuildEvent) -> ReportResult<()> {
        self.post(&self.endpoints.events, &EventPayload::from(event), "submitting build event")
            .await?;

        log::info!(target: LOG_TARGET, "Submitted {} event '{}'", event.severity, event.title);
        Ok(())
    }

    pub async fn submit_log(&self, entry: &LogEntry) -> ReportResult<()> {
        self.post(&self.endpoints.logs, &LogPayload::from(entry), "submitting build log")
            .await?;

        log::info!(target: LOG_TARGET, "Submitted {} log '{}'", entry.status, entry.title);
        Ok(())
    }

    async fn post<T: Serialize + Sync>(&self, url: &Url, payload: &T, operation: &str) -> ReportResult<()> {
        log::debug!(target: LOG_TARGET, "POST {url}");
        let resp = http::send(self.client.post(url.clone()).json(payload), Upstream::Metrics, operation).await?;
        let _ = http::require_success(resp, Upstream::Metrics, operation)?;
        Ok(())
    }
}
