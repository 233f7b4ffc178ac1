//! Migration Definitions - Core types and structures for migrations
//!
//! Defines the step trait every migration implements, a ready-made step
//! holding raw SQL, and the result types reported by the runner.

use async_trait::async_trait;
use semita_core::DatabaseConfig;
use serde::Serialize;

use crate::backends::DatabaseConnection;
use crate::error::OrmResult;

/// A versioned, reversible schema change
#[async_trait]
pub trait Migration: Send + Sync {
    /// Human-readable name, e.g. `create_users_table`
    fn name(&self) -> &str;

    /// Fixed-width `YYYY_MM_DD_HHMMSS` timestamp; the sort key
    fn timestamp(&self) -> &str;

    /// Ledger identifier: `<timestamp>_<name>`
    fn id(&self) -> String {
        format!("{}_{}", self.timestamp(), self.name())
    }

    /// Apply the change
    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()>;

    /// Reverse the change
    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()>;
}

/// Migration made of raw SQL statements executed in order
#[derive(Debug, Clone)]
pub struct SqlMigration {
    name: String,
    timestamp: String,
    up_sql: Vec<String>,
    down_sql: Vec<String>,
}

impl SqlMigration {
    pub fn new(timestamp: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: timestamp.into(),
            up_sql: Vec::new(),
            down_sql: Vec::new(),
        }
    }

    /// Append a statement to run on `up`
    pub fn with_up(mut self, sql: impl Into<String>) -> Self {
        self.up_sql.push(sql.into());
        self
    }

    /// Append a statement to run on `down`
    pub fn with_down(mut self, sql: impl Into<String>) -> Self {
        self.down_sql.push(sql.into());
        self
    }

    async fn run(conn: &mut dyn DatabaseConnection, statements: &[String]) -> OrmResult<()> {
        for statement in statements.iter().filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, &[]).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Migration for SqlMigration {
    fn name(&self) -> &str {
        &self.name
    }

    fn timestamp(&self) -> &str {
        &self.timestamp
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        Self::run(conn, &self.up_sql).await
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        Self::run(conn, &self.down_sql).await
    }
}

/// One ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    /// Migration identifier
    pub migration: String,
    /// Batch number (for grouping migrations)
    pub batch: i64,
}

/// Configuration for the migration system
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Table name for tracking migrations
    pub migrations_table: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_table: "migrations".to_string(),
        }
    }
}

impl From<&DatabaseConfig> for MigrationConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            migrations_table: config.migrations_table.clone(),
        }
    }
}

/// Result of running migrations
#[derive(Debug, Clone, Serialize)]
pub struct MigrationRunResult {
    /// IDs of migrations that were applied, in order
    pub applied: Vec<String>,
    /// Number of migrations that were skipped (already applied)
    pub skipped: usize,
    /// Batch the applied migrations were recorded under
    pub batch: Option<i64>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Result of rolling back migrations
#[derive(Debug, Clone, Serialize)]
pub struct RollbackResult {
    /// IDs of migrations that were rolled back, in order
    pub rolled_back: Vec<String>,
    /// Batch that was reverted; `None` when the ledger was empty
    pub batch: Option<i64>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Migration status in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MigrationStatus {
    /// Migration is pending (not yet applied)
    Pending,
    /// Migration has been applied
    Applied {
        /// Batch number
        batch: i64,
    },
}
