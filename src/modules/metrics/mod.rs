//! Latency samples and their Prometheus exposition

mod exporter;
mod latency;

pub use exporter::{install_prometheus_recorder, routes, spawn_upkeep, UPKEEP_INTERVAL};
pub use latency::{LatencyRecorder, MetricsLatencyRecorder};
