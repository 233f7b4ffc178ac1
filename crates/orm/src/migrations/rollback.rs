//! Migration Rollback - Reverts the most recent batch
//!
//! Executes DOWN actions newest-first and removes the matching ledger rows.

use std::time::Instant;

use super::definitions::RollbackResult;
use super::runner::Migrator;
use crate::error::{MigrationPhase, OrmError, OrmResult};

impl Migrator {
    /// Roll back every migration recorded in the highest batch.
    ///
    /// An empty ledger is a no-op. Every identifier in the batch must still be
    /// registered; otherwise nothing is reverted.
    pub async fn rollback(&mut self) -> OrmResult<RollbackResult> {
        let start_time = Instant::now();

        self.ledger.ensure_table(self.conn.as_mut()).await?;
        let batch = self.ledger.last_batch(self.conn.as_mut()).await?;

        if batch == 0 {
            tracing::info!("Nothing to rollback");
            return Ok(RollbackResult {
                rolled_back: Vec::new(),
                batch: None,
                execution_time_ms: start_time.elapsed().as_millis(),
            });
        }

        let ids = self
            .ledger
            .migrations_in_batch(self.conn.as_mut(), batch)
            .await?;

        let mut steps = Vec::with_capacity(ids.len());
        for id in &ids {
            let migration = self
                .migrations
                .iter()
                .find(|m| &m.id() == id)
                .ok_or_else(|| OrmError::MigrationNotFound(id.clone()))?;
            steps.push(migration);
        }

        let mut rolled_back = Vec::with_capacity(steps.len());
        for migration in steps {
            let id = migration.id();
            tracing::info!("Rolling back migration: {}", id);

            migration
                .down(self.conn.as_mut())
                .await
                .map_err(|e| OrmError::migration(&id, MigrationPhase::Down, e))?;

            self.ledger
                .forget(self.conn.as_mut(), &id)
                .await
                .map_err(|e| OrmError::migration(&id, MigrationPhase::Forget, e))?;

            rolled_back.push(id);
        }

        tracing::info!("Rolled back {} migration(s) from batch {}", rolled_back.len(), batch);

        Ok(RollbackResult {
            rolled_back,
            batch: Some(batch),
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }
}
