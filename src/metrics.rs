//! # Batch Metrics
//!
//! Counters collected by the aggregator over a single run. Serializable so a
//! run summary can be logged or exported as JSON.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metrics for one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    /// Elements pulled from the source and handed to the transform
    pub pulled: u64,

    /// Transform calls that produced a result
    pub emitted: u64,

    /// Transform calls that declined their element
    pub filtered: u64,

    /// Transform calls that failed (at most one, the batch stops there)
    pub failed: u64,

    /// Whether the run ended because of cancellation
    pub cancelled: bool,

    /// Time spent awaiting transforms
    pub transform_duration: Duration,

    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transform calls that ran to completion
    pub fn transformed(&self) -> u64 {
        self.emitted + self.filtered + self.failed
    }

    /// Fraction of completed transforms that declined their element
    pub fn filter_rate(&self) -> f64 {
        let transformed = self.transformed();
        if transformed == 0 {
            return 0.0;
        }

        self.filtered as f64 / transformed as f64
    }

    pub fn average_transform_duration(&self) -> Duration {
        match u32::try_from(self.transformed()) {
            Ok(0) => Duration::ZERO,
            Ok(count) => self.transform_duration / count,
            Err(_) => Duration::from_secs_f64(
                self.transform_duration.as_secs_f64() / self.transformed() as f64,
            ),
        }
    }

    /// JSON form of the metrics for structured log fields
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// True when the source was drained with no failure or cancellation
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }

    pub(crate) fn record_emitted(&mut self, duration: Duration) {
        self.emitted += 1;
        self.transform_duration += duration;
    }

    pub(crate) fn record_filtered(&mut self, duration: Duration) {
        self.filtered += 1;
        self.transform_duration += duration;
    }

    pub(crate) fn record_failed(&mut self, duration: Duration) {
        self.failed += 1;
        self.transform_duration += duration;
    }
}
