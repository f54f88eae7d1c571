//! Configuration Loader
//!
//! Layers built-in defaults, an optional TOML file, and `BATCHMAP__*`
//! environment variables (later layers win), then validates the result.

use super::error::{ConfigResult, ConfigurationError};
use super::BatchConfig;
use ::config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Prefix for environment overrides, e.g. `BATCHMAP__PROGRESS_INTERVAL=50`
pub const ENV_PREFIX: &str = "BATCHMAP";

const ENV_SEPARATOR: &str = "__";

impl BatchConfig {
    /// Load configuration from defaults, `path` (if it exists) and the process
    /// environment
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_from_sources(path, None)
    }

    /// Load configuration with an explicit environment map instead of the
    /// process environment
    pub fn load_with_env(path: Option<&Path>, env: HashMap<String, String>) -> ConfigResult<Self> {
        Self::load_from_sources(path, Some(env))
    }

    fn load_from_sources(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        let defaults = BatchConfig::default();

        let mut builder = Config::builder()
            .set_default("label", defaults.label)?
            .set_default(
                "slow_transform_threshold_ms",
                defaults.slow_transform_threshold_ms,
            )?
            .set_default("progress_interval", defaults.progress_interval)?;

        if let Some(path) = path {
            debug!(file = %path.display(), "Adding batch configuration file");
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        );

        let merged = builder.build().map_err(|e| {
            let file_path = path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<environment>".to_string());
            ConfigurationError::file_load_error(file_path, e)
        })?;

        let config: BatchConfig = merged.try_deserialize()?;
        config.validate()?;

        debug!(
            label = %config.label,
            slow_transform_threshold_ms = config.slow_transform_threshold_ms,
            progress_interval = config.progress_interval,
            "Batch configuration loaded"
        );

        Ok(config)
    }
}
