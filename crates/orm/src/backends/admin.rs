//! Dialect-specific schema administration
//!
//! Listing tables, toggling foreign-key enforcement, reading foreign-key edges
//! and creating the migration ledger differ per backend. Each backend provides
//! a [`SchemaAdmin`] and the engine picks one from the connection's dialect.

use async_trait::async_trait;

use super::core::{BoxFuture, DatabaseConnection, SqlDialect};
use crate::error::{OrmError, OrmResult};

/// Administrative capabilities of one SQL dialect
#[async_trait]
pub trait SchemaAdmin: Send + Sync {
    /// Names of all user tables in the current database
    async fn list_tables(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<Vec<String>>;

    /// Enable or disable foreign-key enforcement for this connection
    async fn set_foreign_key_checks(
        &self,
        conn: &mut dyn DatabaseConnection,
        enabled: bool,
    ) -> OrmResult<()>;

    /// `(table, referenced_table)` pairs for every foreign key in the database
    async fn foreign_keys(
        &self,
        conn: &mut dyn DatabaseConnection,
    ) -> OrmResult<Vec<(String, String)>>;

    /// DDL creating the migration ledger table if it is missing
    fn ledger_table_sql(&self, table: &str) -> String;

    /// DDL dropping a table if it exists
    fn drop_table_sql(&self, table: &str) -> String;
}

/// MySQL-family administration
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlAdmin;

#[async_trait]
impl SchemaAdmin for MySqlAdmin {
    async fn list_tables(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<Vec<String>> {
        let rows = conn.fetch_all("SHOW TABLES", &[]).await?;
        rows.iter()
            .map(|row| {
                row.get_by_index(0)?
                    .as_text()
                    .ok_or_else(|| {
                        OrmError::Schema("SHOW TABLES returned a non-text name".to_string())
                    })
            })
            .collect()
    }

    async fn set_foreign_key_checks(
        &self,
        conn: &mut dyn DatabaseConnection,
        enabled: bool,
    ) -> OrmResult<()> {
        let sql = if enabled {
            "SET FOREIGN_KEY_CHECKS = 1"
        } else {
            "SET FOREIGN_KEY_CHECKS = 0"
        };
        conn.execute(sql, &[]).await?;
        Ok(())
    }

    async fn foreign_keys(
        &self,
        conn: &mut dyn DatabaseConnection,
    ) -> OrmResult<Vec<(String, String)>> {
        let rows = conn
            .fetch_all(
                "SELECT TABLE_NAME, REFERENCED_TABLE_NAME FROM information_schema.KEY_COLUMN_USAGE \
                 WHERE TABLE_SCHEMA = DATABASE() AND REFERENCED_TABLE_NAME IS NOT NULL",
                &[],
            )
            .await?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in rows {
            let table = row.get_by_index(0)?.as_text();
            let referenced = row.get_by_index(1)?.as_text();
            if let (Some(table), Some(referenced)) = (table, referenced) {
                edges.push((table, referenced));
            }
        }
        Ok(edges)
    }

    fn ledger_table_sql(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id INT PRIMARY KEY AUTO_INCREMENT, \
             migration VARCHAR(255) NOT NULL, \
             batch INT NOT NULL, \
             executed_at DATETIME DEFAULT CURRENT_TIMESTAMP)",
            table
        )
    }

    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", SqlDialect::MySql.quote_identifier(table))
    }
}

/// SQLite administration
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteAdmin;

#[async_trait]
impl SchemaAdmin for SqliteAdmin {
    async fn list_tables(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<Vec<String>> {
        let rows = conn
            .fetch_all(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                &[],
            )
            .await?;
        rows.iter()
            .map(|row| {
                row.get_by_index(0)?
                    .as_text()
                    .ok_or_else(|| {
                        OrmError::Schema("sqlite_master returned a non-text name".to_string())
                    })
            })
            .collect()
    }

    async fn set_foreign_key_checks(
        &self,
        conn: &mut dyn DatabaseConnection,
        enabled: bool,
    ) -> OrmResult<()> {
        let sql = if enabled {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        };
        conn.execute(sql, &[]).await?;
        Ok(())
    }

    async fn foreign_keys(
        &self,
        conn: &mut dyn DatabaseConnection,
    ) -> OrmResult<Vec<(String, String)>> {
        let mut edges = Vec::new();
        for table in self.list_tables(conn).await? {
            let sql = format!(
                "PRAGMA foreign_key_list({})",
                SqlDialect::Sqlite.quote_identifier(&table)
            );
            for row in conn.fetch_all(&sql, &[]).await? {
                if let Some(referenced) = row.get_by_name("table")?.as_text() {
                    edges.push((table.clone(), referenced));
                }
            }
        }
        Ok(edges)
    }

    fn ledger_table_sql(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             migration VARCHAR(255) NOT NULL, \
             batch INTEGER NOT NULL, \
             executed_at DATETIME DEFAULT CURRENT_TIMESTAMP)",
            table
        )
    }

    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", SqlDialect::Sqlite.quote_identifier(table))
    }
}

/// Select the administration capabilities for a dialect
pub fn schema_admin(dialect: SqlDialect) -> Box<dyn SchemaAdmin> {
    match dialect {
        SqlDialect::MySql => Box::new(MySqlAdmin),
        SqlDialect::Sqlite => Box::new(SqliteAdmin),
    }
}

/// Run `f` with foreign-key enforcement disabled on `conn`.
///
/// Checks are switched back on whether or not `f` succeeds. Failing to toggle
/// them is logged and does not fail the operation.
pub async fn with_foreign_key_checks_disabled<T, F>(
    conn: &mut dyn DatabaseConnection,
    f: F,
) -> OrmResult<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut dyn DatabaseConnection) -> BoxFuture<'c, OrmResult<T>> + Send,
{
    let admin = schema_admin(conn.dialect());

    if let Err(e) = admin.set_foreign_key_checks(&mut *conn, false).await {
        tracing::warn!("Failed to disable foreign key checks: {}", e);
    }

    let result = f(&mut *conn).await;

    if let Err(e) = admin.set_foreign_key_checks(&mut *conn, true).await {
        tracing::warn!("Failed to re-enable foreign key checks: {}", e);
    }

    result
}
