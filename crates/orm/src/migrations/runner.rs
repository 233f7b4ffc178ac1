//! Migration Runner - Executes migrations against the database
//!
//! Handles the actual execution of migrations, tracking applied migrations in
//! the ledger, and grouping each run into a batch.

use std::time::Instant;

use super::definitions::{Migration, MigrationConfig, MigrationRunResult, MigrationStatus};
use super::ledger::Ledger;
use crate::backends::{DatabaseConnection, QueryResult};
use crate::error::{MigrationPhase, OrmError, OrmResult};

/// Migration runner that owns one connection and a registry of steps
pub struct Migrator {
    pub(crate) conn: Box<dyn DatabaseConnection>,
    pub(crate) ledger: Ledger,
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl Migrator {
    /// Create a migrator using the default ledger table
    pub fn new(conn: Box<dyn DatabaseConnection>) -> Self {
        Self::with_config(conn, MigrationConfig::default())
    }

    /// Create a migrator with an explicit configuration
    pub fn with_config(conn: Box<dyn DatabaseConnection>, config: MigrationConfig) -> Self {
        Self {
            conn,
            ledger: Ledger::new(config.migrations_table),
            migrations: Vec::new(),
        }
    }

    /// Register a step. A step with an already registered id replaces it.
    pub fn register<M: Migration + 'static>(&mut self, migration: M) -> &mut Self {
        self.register_boxed(Box::new(migration))
    }

    /// Register a boxed step
    pub fn register_boxed(&mut self, migration: Box<dyn Migration>) -> &mut Self {
        let id = migration.id();
        match self.migrations.iter().position(|m| m.id() == id) {
            Some(index) => {
                tracing::debug!("Replacing registered migration {}", id);
                self.migrations[index] = migration;
            }
            None => self.migrations.push(migration),
        }
        self
    }

    /// Registered step ids in execution order
    pub fn migration_ids(&mut self) -> Vec<String> {
        self.sort_migrations();
        self.migrations.iter().map(|m| m.id()).collect()
    }

    /// Name of the ledger table
    pub fn ledger_table(&self) -> &str {
        self.ledger.table()
    }

    /// Borrow the underlying connection
    pub fn connection(&mut self) -> &mut dyn DatabaseConnection {
        self.conn.as_mut()
    }

    /// Give the connection back, e.g. to hand it to the seeder manager
    pub fn into_connection(self) -> Box<dyn DatabaseConnection> {
        self.conn
    }

    /// Close the underlying connection
    pub async fn close(&mut self) -> OrmResult<()> {
        self.conn.close().await
    }

    pub(crate) fn sort_migrations(&mut self) {
        // Fixed-width timestamps sort correctly as strings; ties keep registration order
        self.migrations
            .sort_by(|a, b| a.timestamp().cmp(b.timestamp()));
    }

    /// Run all pending migrations in timestamp order under one new batch
    pub async fn migrate(&mut self) -> OrmResult<MigrationRunResult> {
        let start_time = Instant::now();

        self.ledger.ensure_table(self.conn.as_mut()).await?;
        let applied_ids = self.ledger.applied_ids(self.conn.as_mut()).await?;
        self.sort_migrations();
        let batch = self.ledger.next_batch(self.conn.as_mut()).await?;

        let mut applied = Vec::new();
        let mut skipped = 0;

        for migration in &self.migrations {
            let id = migration.id();
            if applied_ids.contains(&id) {
                tracing::debug!("Skipping already applied migration {}", id);
                skipped += 1;
                continue;
            }

            tracing::info!("Applying migration: {}", id);
            migration
                .up(self.conn.as_mut())
                .await
                .map_err(|e| OrmError::migration(&id, MigrationPhase::Up, e))?;

            self.ledger
                .record(self.conn.as_mut(), &id, batch)
                .await
                .map_err(|e| OrmError::migration(&id, MigrationPhase::Record, e))?;

            applied.push(id);
        }

        if applied.is_empty() {
            tracing::info!("Nothing to migrate");
        } else {
            tracing::info!("Applied {} migration(s) in batch {}", applied.len(), batch);
        }

        Ok(MigrationRunResult {
            batch: (!applied.is_empty()).then_some(batch),
            applied,
            skipped,
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Status of every registered step, in execution order
    pub async fn status(&mut self) -> OrmResult<Vec<(String, MigrationStatus)>> {
        self.ledger.ensure_table(self.conn.as_mut()).await?;
        let records = self.ledger.records(self.conn.as_mut()).await?;
        self.sort_migrations();

        Ok(self
            .migrations
            .iter()
            .map(|migration| {
                let id = migration.id();
                let status = records
                    .iter()
                    .find(|r| r.migration == id)
                    .map(|r| MigrationStatus::Applied { batch: r.batch })
                    .unwrap_or(MigrationStatus::Pending);
                (id, status)
            })
            .collect())
    }

    /// Execute an ad-hoc administrative statement
    pub async fn execute_sql(&mut self, sql: &str) -> OrmResult<QueryResult> {
        tracing::debug!("Executing raw SQL: {}", sql);
        self.conn.execute(sql, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::SqliteConnection;
    use crate::migrations::SqlMigration;

    async fn migrator() -> Migrator {
        let conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        Migrator::new(Box::new(conn))
    }

    #[tokio::test]
    async fn test_registration_sorts_and_replaces() {
        let mut migrator = migrator().await;
        migrator
            .register(SqlMigration::new("2024_01_02_000000", "second"))
            .register(SqlMigration::new("2024_01_01_000000", "first"))
            .register(SqlMigration::new("2024_01_02_000000", "second").with_up("SELECT 1"));

        assert_eq!(
            migrator.migration_ids(),
            vec![
                "2024_01_01_000000_first".to_string(),
                "2024_01_02_000000_second".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_step_reports_id_and_phase() {
        let mut migrator = migrator().await;
        migrator.register(
            SqlMigration::new("2024_01_01_000000", "broken").with_up("CREATE TABLE"),
        );

        let err = migrator.migrate().await.unwrap_err();
        match err {
            OrmError::Migration { id, phase, .. } => {
                assert_eq!(id, "2024_01_01_000000_broken");
                assert_eq!(phase, MigrationPhase::Up);
            }
            other => panic!("unexpected error: {}", other),
        }

        let status = migrator.status().await.unwrap();
        assert_eq!(status[0].1, MigrationStatus::Pending);
    }

    #[tokio::test]
    async fn test_execute_sql_escape_hatch() {
        let mut migrator = migrator().await;
        migrator.execute_sql("CREATE TABLE scratch (id INTEGER)").await.unwrap();
        let result = migrator
            .execute_sql("INSERT INTO scratch (id) VALUES (1)")
            .await
            .unwrap();
        assert_eq!(result.rows_affected(), 1);
    }
}
