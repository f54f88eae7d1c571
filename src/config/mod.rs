//! # Batch Configuration
//!
//! Settings that shape how a batch run is observed: the label attached to its
//! logs, when a single transform counts as slow, and how often progress is
//! reported. None of them change what a run produces.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use batchmap_core::config::BatchConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Defaults, then batchmap.toml if present, then BATCHMAP__* variables
//! let config = BatchConfig::load(Some(std::path::Path::new("batchmap.toml")))?;
//! println!("label = {}", config.label);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};

/// Default label for runs that were not given one
pub const DEFAULT_LABEL: &str = "batch";

/// Default threshold above which a single transform call is logged as slow
pub const DEFAULT_SLOW_TRANSFORM_THRESHOLD_MS: u64 = 1_000;

/// Configuration for an aggregator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Label attached to every log line of the run
    pub label: String,

    /// Transform calls taking longer than this are logged at warn level
    pub slow_transform_threshold_ms: u64,

    /// Log a progress line every N pulled elements (0 disables)
    pub progress_interval: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            slow_transform_threshold_ms: DEFAULT_SLOW_TRANSFORM_THRESHOLD_MS,
            progress_interval: 0,
        }
    }
}

impl BatchConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_slow_transform_threshold(mut self, threshold: Duration) -> Self {
        self.slow_transform_threshold_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn slow_transform_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_transform_threshold_ms)
    }

    /// Whether a progress line is due after `pulled` elements
    pub fn progress_due(&self, pulled: u64) -> bool {
        self.progress_interval > 0 && pulled % self.progress_interval == 0
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.label.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "label",
                self.label.clone(),
                "label must not be empty",
            ));
        }

        if self.slow_transform_threshold_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "slow_transform_threshold_ms",
                "0",
                "threshold must be greater than 0",
            ));
        }

        Ok(())
    }
}
