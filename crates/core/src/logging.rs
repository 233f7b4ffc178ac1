//! # Logging
//!
//! `tracing-subscriber` setup for the operator commands. Library code only
//! emits `tracing` events; the binary decides how they are rendered.

use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;
use crate::error::CoreError;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Include the event target (module path) in each line
    pub include_target: bool,
    /// Environment filter (supports complex filters like "semita_orm=debug,sqlx=warn")
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_target: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            include_target: true,
            env_filter: Some("semita=info,semita_orm=info,sqlx=warn".to_string()),
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            include_target: false,
            env_filter: Some("semita=debug,semita_orm=debug,sqlx=warn".to_string()),
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            include_target: false,
            env_filter: Some("semita_orm=error".to_string()),
        }
    }

    /// Pick the preset for an environment
    pub fn for_environment(environment: &Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Testing => Self::test(),
            Environment::Production => Self::production(),
        }
    }

    /// Override the level; clears any preset filter so the level applies everywhere
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self.env_filter = None;
        self
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

/// Initialize logging for the process. `RUST_LOG` wins over the configured filter.
pub fn init_logging(config: LoggingConfig) -> Result<(), CoreError> {
    let env_filter = config.env_filter.as_deref().unwrap_or(&config.level);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(env_filter))
        .map_err(|e| CoreError::Logging {
            message: format!("invalid filter '{}': {}", env_filter, e),
        })?;

    let result = if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).with_target(config.include_target).json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).with_target(config.include_target))
            .try_init()
    };

    result.map_err(|e| CoreError::Logging {
        message: e.to_string(),
    })?;

    tracing::debug!("Logging initialized with filter '{}'", env_filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(LoggingConfig::production().json_format);
        assert!(!LoggingConfig::development().json_format);
        assert_eq!(LoggingConfig::test().level, "error");
    }

    #[test]
    fn test_environment_selects_preset() {
        let config = LoggingConfig::for_environment(&Environment::Production);
        assert!(config.json_format);

        let config = LoggingConfig::for_environment(&Environment::Development).with_level("warn");
        assert_eq!(config.level, "warn");
        assert!(config.env_filter.is_none());
    }
}
