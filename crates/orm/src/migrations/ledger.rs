//! Applied-migration ledger
//!
//! The ledger lives inside the target database: one row per applied migration
//! with its batch number. Every method takes the connection explicitly so the
//! runner can lend it to migration steps in between.

use std::collections::HashSet;

use super::definitions::MigrationRecord;
use crate::backends::{schema_admin, DatabaseConnection, DatabaseValue};
use crate::error::{OrmError, OrmResult};

/// Accessor for the ledger table
#[derive(Debug, Clone)]
pub struct Ledger {
    table: String,
}

impl Ledger {
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into() }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the ledger table when missing
    pub async fn ensure_table(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = schema_admin(conn.dialect()).ledger_table_sql(&self.table);
        conn.execute(&sql, &[])
            .await
            .map_err(|e| OrmError::ledger(format!("create table {}", self.table), e))?;
        Ok(())
    }

    /// Drop the ledger table
    pub async fn drop_table(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = schema_admin(conn.dialect()).drop_table_sql(&self.table);
        conn.execute(&sql, &[])
            .await
            .map_err(|e| OrmError::ledger(format!("drop table {}", self.table), e))?;
        Ok(())
    }

    /// Identifiers of every applied migration
    pub async fn applied_ids(
        &self,
        conn: &mut dyn DatabaseConnection,
    ) -> OrmResult<HashSet<String>> {
        let sql = format!("SELECT migration FROM {}", self.table);
        let rows = conn
            .fetch_all(&sql, &[])
            .await
            .map_err(|e| OrmError::ledger("read applied migrations", e))?;

        rows.iter()
            .map(|row| {
                row.get_by_index(0)?
                    .as_text()
                    .ok_or_else(|| {
                        OrmError::ledger("read applied migrations", "non-text identifier")
                    })
            })
            .collect()
    }

    /// Every ledger row in insertion order
    pub async fn records(
        &self,
        conn: &mut dyn DatabaseConnection,
    ) -> OrmResult<Vec<MigrationRecord>> {
        let sql = format!("SELECT migration, batch FROM {} ORDER BY id", self.table);
        let rows = conn
            .fetch_all(&sql, &[])
            .await
            .map_err(|e| OrmError::ledger("read ledger rows", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let migration = row
                .get_by_name("migration")?
                .as_text()
                .ok_or_else(|| OrmError::ledger("read ledger rows", "non-text identifier"))?;
            let batch = row
                .get_by_name("batch")?
                .as_i64()
                .ok_or_else(|| OrmError::ledger("read ledger rows", "non-integer batch"))?;
            records.push(MigrationRecord { migration, batch });
        }
        Ok(records)
    }

    /// Highest recorded batch, 0 when the ledger is empty
    pub async fn last_batch(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<i64> {
        let sql = format!("SELECT COALESCE(MAX(batch), 0) FROM {}", self.table);
        let row = conn
            .fetch_optional(&sql, &[])
            .await
            .map_err(|e| OrmError::ledger("read last batch", e))?;

        match row {
            Some(row) => row
                .get_by_index(0)?
                .as_i64()
                .ok_or_else(|| OrmError::ledger("read last batch", "non-integer batch")),
            None => Ok(0),
        }
    }

    /// Batch number the next `migrate` run records under
    pub async fn next_batch(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<i64> {
        Ok(self.last_batch(conn).await? + 1)
    }

    /// Identifiers recorded in `batch`, most recently applied first
    pub async fn migrations_in_batch(
        &self,
        conn: &mut dyn DatabaseConnection,
        batch: i64,
    ) -> OrmResult<Vec<String>> {
        let sql = format!(
            "SELECT migration FROM {} WHERE batch = ? ORDER BY id DESC",
            self.table
        );
        let rows = conn
            .fetch_all(&sql, &[DatabaseValue::Int64(batch)])
            .await
            .map_err(|e| OrmError::ledger(format!("read batch {}", batch), e))?;

        rows.iter()
            .map(|row| {
                row.get_by_index(0)?
                    .as_text()
                    .ok_or_else(|| {
                        OrmError::ledger(format!("read batch {}", batch), "non-text identifier")
                    })
            })
            .collect()
    }

    /// Insert a row for an applied migration
    pub async fn record(
        &self,
        conn: &mut dyn DatabaseConnection,
        id: &str,
        batch: i64,
    ) -> OrmResult<()> {
        let sql = format!("INSERT INTO {} (migration, batch) VALUES (?, ?)", self.table);
        conn.execute(&sql, &[id.into(), DatabaseValue::Int64(batch)]).await?;
        Ok(())
    }

    /// Remove the row of a reverted migration
    pub async fn forget(&self, conn: &mut dyn DatabaseConnection, id: &str) -> OrmResult<()> {
        let sql = format!("DELETE FROM {} WHERE migration = ?", self.table);
        conn.execute(&sql, &[id.into()]).await?;
        Ok(())
    }
}
