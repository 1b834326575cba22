use std::time::Duration;

/// Histogram all operation latency samples are recorded under
pub const OPERATION_LATENCY_METRIC: &str = "operation_latency_milliseconds";

/// Sink for named latency samples
pub trait LatencyRecorder: Send + Sync {
    fn record_latency(&self, name: &str, elapsed: Duration);
}

/// Records latency samples through the global `metrics` recorder
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsLatencyRecorder;

impl LatencyRecorder for MetricsLatencyRecorder {
    fn record_latency(&self, name: &str, elapsed: Duration) {
        let millis = elapsed.as_secs_f64() * 1000.0;
        ::metrics::histogram!(OPERATION_LATENCY_METRIC, "name" => name.to_string()).record(millis);
        tracing::debug!("Recorded latency sample {}: {:.2}ms", name, millis);
    }
}
