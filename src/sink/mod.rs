//! Delivery of metric points, events, and log records to the metrics backend.

mod client;
mod payload;

pub use client::{SinkClient, SinkEndpoints};
