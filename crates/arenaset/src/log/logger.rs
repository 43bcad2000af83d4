//! Metric logger traits and composites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Sink for named scalar metrics.
pub trait MetricLogger: Send + Sync {
    fn log_scalar(&self, name: &str, value: f64, step: u64);

    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        for (name, value) in metrics {
            self.log_scalar(name, *value, step);
        }
    }

    /// Flush any pending writes.
    fn close(&self) {}
}

impl<L: MetricLogger + ?Sized> MetricLogger for Arc<L> {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        (**self).log_scalar(name, value, step);
    }

    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        (**self).log_metrics(metrics, step);
    }

    fn close(&self) {
        (**self).close();
    }
}

pub struct NoOpLogger;

impl MetricLogger for NoOpLogger {
    fn log_scalar(&self, _name: &str, _value: f64, _step: u64) {}
    fn log_metrics(&self, _metrics: &HashMap<String, f64>, _step: u64) {}
}

/// Keeps every logged value in memory.
#[derive(Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<(String, f64, u64)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in logging order.
    pub fn records(&self) -> Vec<(String, f64, u64)> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Most recent value logged under `name`.
    pub fn last(&self, name: &str) -> Option<f64> {
        self.records
            .lock()
            .ok()?
            .iter()
            .rev()
            .find(|(n, _, _)| n == name)
            .map(|(_, v, _)| *v)
    }
}

impl MetricLogger for MemoryLogger {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        if let Ok(mut records) = self.records.lock() {
            records.push((name.to_string(), value, step));
        }
    }
}

/// Dispatches to several backends.
pub struct CompositeLogger {
    loggers: Vec<Box<dyn MetricLogger>>,
}

impl CompositeLogger {
    pub fn new(loggers: Vec<Box<dyn MetricLogger>>) -> Self {
        Self { loggers }
    }

    pub fn add(&mut self, logger: Box<dyn MetricLogger>) {
        self.loggers.push(logger);
    }
}

impl MetricLogger for CompositeLogger {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        for logger in &self.loggers {
            logger.log_scalar(name, value, step);
        }
    }

    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        for logger in &self.loggers {
            logger.log_metrics(metrics, step);
        }
    }

    fn close(&self) {
        for logger in &self.loggers {
            logger.close();
        }
    }
}
