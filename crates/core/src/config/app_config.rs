use crate::config::{ConfigError, DatabaseConfig};
use std::env;
use std::str::FromStr;

/// Configuration trait for values assembled from the process environment
pub trait AppConfigTrait: Sized {
    /// Load configuration through a key lookup function
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

/// Environment enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    /// Check if environment is development
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Check if environment is testing
    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    /// Check if environment is production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Application configuration consumed by the operator commands
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub log_level: String,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Default log level for an environment
    fn default_log_level(environment: &Environment) -> &'static str {
        match environment {
            Environment::Development => "debug",
            Environment::Testing => "warn",
            Environment::Production => "info",
        }
    }
}

impl AppConfigTrait for AppConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::Development,
        };

        let log_level = lookup("LOG_LEVEL")
            .unwrap_or_else(|| Self::default_log_level(&environment).to_string());

        let database = DatabaseConfig::from_lookup(&lookup)?;

        let config = Self {
            environment,
            log_level,
            database,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                self.log_level.clone(),
                format!("one of: {}", valid_levels.join(", ")),
            ));
        }

        self.database.validate()
    }
}
