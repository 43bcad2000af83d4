//! Console logging backend.

use super::MetricLogger;
use std::collections::HashMap;

/// Logger that reports metrics through `tracing` at info level.
#[derive(Default)]
pub struct ConsoleLogger {
    prefix: Option<String>,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix/` to every metric name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn full_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{}/{}", p, name),
            None => name.to_string(),
        }
    }
}

impl MetricLogger for ConsoleLogger {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        tracing::info!("Step {}: {} = {:.4}", step, self.full_name(name), value);
    }

    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        // One line per call
        let mut keys: Vec<_> = metrics.iter().collect();
        keys.sort_by(|a, b| a.0.cmp(b.0));

        let body = keys
            .iter()
            .map(|(k, v)| format!("{}={:.4}", self.full_name(k), v))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!("Step {}: {}", step, body);
    }
}
