//! Error types for the database engine
//!
//! Every failure that leaves the engine is an [`OrmError`]. Variants follow the
//! failure classes an operator has to tell apart: the database could not be
//! reached, the ledger could not be read or written, a step failed, or a name
//! did not resolve.

use thiserror::Error;

/// Result type alias for engine operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Phase of a migration step in which an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    /// Running the step's `up` action
    Up,
    /// Running the step's `down` action
    Down,
    /// Inserting the ledger row after a successful `up`
    Record,
    /// Deleting the ledger row after a successful `down`
    Forget,
}

impl std::fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match self {
            MigrationPhase::Up => "up",
            MigrationPhase::Down => "down",
            MigrationPhase::Record => "record",
            MigrationPhase::Forget => "forget",
        };
        write!(f, "{}", phase)
    }
}

/// Error types for engine operations
#[derive(Error, Debug)]
pub enum OrmError {
    /// Statement failed in the driver
    #[error("Database error: {0}")]
    Database(String),

    /// Could not open or use the connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid URL or engine configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Ledger table could not be created, read or written
    #[error("Migration ledger error while trying to {operation}: {message}")]
    Ledger { operation: String, message: String },

    /// A migration step failed
    #[error("Migration {id} failed during {phase}: {message}")]
    Migration {
        id: String,
        phase: MigrationPhase,
        message: String,
    },

    /// The ledger names a migration that is not registered
    #[error("Migration {0} is recorded in the ledger but not registered")]
    MigrationNotFound(String),

    /// No seeder registered under this name
    #[error("Seeder '{0}' is not registered")]
    SeederNotFound(String),

    /// A seeder's `seed` action failed
    #[error("Seeder '{name}' failed: {message}")]
    Seeder { name: String, message: String },

    /// The seeder dependency graph contains a cycle
    #[error("Circular dependency detected in seeders: {}", .0.join(", "))]
    CircularDependency(Vec<String>),

    /// A row could not be decoded
    #[error("Query error: {0}")]
    Query(String),

    /// Dialect-specific schema administration failed
    #[error("Schema error: {0}")]
    Schema(String),
}

impl OrmError {
    /// Wrap an error as a step failure for the given migration and phase
    pub fn migration(
        id: impl Into<String>,
        phase: MigrationPhase,
        source: impl std::fmt::Display,
    ) -> Self {
        OrmError::Migration {
            id: id.into(),
            phase,
            message: source.to_string(),
        }
    }

    /// Wrap an error as a ledger failure for the named operation
    pub fn ledger(operation: impl Into<String>, source: impl std::fmt::Display) -> Self {
        OrmError::Ledger {
            operation: operation.into(),
            message: source.to_string(),
        }
    }

    /// Wrap an error raised by a seeder
    pub fn seeder(name: impl Into<String>, source: impl std::fmt::Display) -> Self {
        OrmError::Seeder {
            name: name.into(),
            message: source.to_string(),
        }
    }
}

impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        OrmError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        OrmError::Query(err.to_string())
    }
}
