//! Wire shapes for the metrics backend's submission endpoints.

use crate::metrics::{BuildEvent, LogEntry, MetricPoint};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SeriesPayload<'a> {
    pub series: Vec<Series<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Series<'a> {
    pub metric: &'a str,
    pub points: [(i64, f64); 1],
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub tags: &'a [String],
}

impl<'a> SeriesPayload<'a> {
    pub fn new(points: &'a [MetricPoint]) -> Self {
        Self {
            series: points
                .iter()
                .map(|p| Series {
                    metric: p.name,
                    points: [(p.timestamp, p.value)],
                    kind: p.kind.as_ref(),
                    tags: p.tags.as_slice(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventPayload<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub priority: &'a str,
    pub tags: &'a [String],
    pub alert_type: &'a str,
}

impl<'a> From<&'a BuildEvent> for EventPayload<'a> {
    fn from(event: &'a BuildEvent) -> Self {
        Self {
            title: &event.title,
            text: &event.text,
            priority: event.priority.as_ref(),
            tags: event.tags.as_slice(),
            alert_type: event.severity.as_ref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogPayload<'a> {
    pub ddsource: &'a str,
    pub ddtags: String,
    pub hostname: &'a str,
    pub message: &'a str,
    pub status: &'a str,
    pub service: &'a str,
    pub title: &'a str,
}

impl<'a> From<&'a LogEntry> for LogPayload<'a> {
    fn from(entry: &'a LogEntry) -> Self {
        Self {
            ddsource: entry.source,
            ddtags: entry.tags.as_slice().join(","),
            hostname: entry.hostname,
            message: &entry.message,
            status: entry.status.as_ref(),
            service: &entry.service,
            title: &entry.title,
        }
    }
}
