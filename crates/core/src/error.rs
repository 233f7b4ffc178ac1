use thiserror::Error;

use crate::config::ConfigError;

/// Core error type shared by the semita crates
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Logging initialization failed: {message}")]
    Logging { message: String },

    #[error("Template error: {message}")]
    Template { message: String },
}

impl CoreError {
    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
