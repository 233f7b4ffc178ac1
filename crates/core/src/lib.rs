//! # semita-core
//!
//! Environment-driven configuration, logging setup and the shared error type
//! used by the semita migration and seeding toolkit.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    AppConfig, AppConfigTrait, ConfigError, DatabaseConfig, DatabaseDriver, Environment,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, LoggingConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
