//! SQLite Backend Implementation
//!
//! One `sqlx` SQLite connection wrapped as a [`DatabaseConnection`]. Used for
//! local runs against a file and for tests against `sqlite::memory:`.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Row, Sqlite, ValueRef};

use super::core::*;
use crate::error::{OrmError, OrmResult};

/// SQLite connection implementation
pub struct SqliteConnection {
    conn: Option<sqlx::SqliteConnection>,
}

impl SqliteConnection {
    /// Open a connection to a `sqlite:` URL with foreign keys enforced
    pub async fn connect(database_url: &str) -> OrmResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| OrmError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .foreign_keys(true);

        let conn = options
            .connect()
            .await
            .map_err(|e| OrmError::Connection(format!("Failed to open SQLite database: {}", e)))?;

        tracing::debug!("Opened SQLite connection");
        Ok(Self { conn: Some(conn) })
    }

    fn live(&mut self) -> OrmResult<&mut sqlx::SqliteConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| OrmError::Connection("Connection is closed".to_string()))
    }
}

#[async_trait]
impl DatabaseConnection for SqliteConnection {
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<QueryResult> {
        let conn = self.live()?;
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let result = query.execute(&mut *conn).await?;
        // The rowid carries over from the previous insert on other statements
        let last_insert_id = match result.last_insert_rowid() {
            id if id != 0 && inserts_rows(sql) => Some(id),
            _ => None,
        };

        Ok(QueryResult::new(result.rows_affected(), last_insert_id))
    }

    async fn fetch_all(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        let conn = self.live()?;
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let rows = query.fetch_all(&mut *conn).await?;
        rows.iter()
            .map(|row| materialize(row).map(|r| Box::new(r) as Box<dyn DatabaseRow>))
            .collect()
    }

    async fn fetch_optional(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
        let conn = self.live()?;
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let row = query.fetch_optional(&mut *conn).await?;
        row.as_ref()
            .map(|r| materialize(r).map(|r| Box::new(r) as Box<dyn DatabaseRow>))
            .transpose()
    }

    async fn close(&mut self) -> OrmResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| {
                    OrmError::Connection(format!("Failed to close SQLite connection: {}", e))
                })?;
        }
        Ok(())
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }
}

/// Whether the statement is an `INSERT` or `REPLACE`
fn inserts_rows(sql: &str) -> bool {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &DatabaseValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int32(i) => query.bind(*i),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Uuid(u) => query.bind(u.to_string()),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Date(d) => query.bind(*d),
        DatabaseValue::Time(t) => query.bind(*t),
        DatabaseValue::Json(j) => query.bind(j.to_string()),
    }
}

fn materialize(row: &SqliteRow) -> OrmResult<ResultRow> {
    let columns: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let values = (0..columns.len())
        .map(|index| sqlite_value_to_database_value(row, index))
        .collect::<OrmResult<Vec<_>>>()?;
    Ok(ResultRow::new(columns, values))
}

/// Convert a SQLite column value to DatabaseValue following its storage class
fn sqlite_value_to_database_value(row: &SqliteRow, index: usize) -> OrmResult<DatabaseValue> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(DatabaseValue::Null);
    }

    if let Ok(value) = row.try_get::<i64, _>(index) {
        return Ok(DatabaseValue::Int64(value));
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Ok(DatabaseValue::Float64(value));
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Ok(DatabaseValue::String(value));
    }

    row.try_get::<Vec<u8>, _>(index)
        .map(DatabaseValue::Bytes)
        .map_err(|e| {
            OrmError::Query(format!(
                "Failed to decode column '{}': {}",
                row.columns()[index].name(),
                e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_against_memory_database() {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        conn.execute(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT, score REAL)",
            &[],
        )
        .await
        .unwrap();

        let result = conn
            .execute(
                "INSERT INTO notes (body, score) VALUES (?, ?)",
                &["hello".into(), 1.5.into()],
            )
            .await
            .unwrap();
        assert_eq!(result.rows_affected(), 1);
        assert_eq!(result.last_insert_id(), Some(1));

        let row = conn
            .fetch_optional("SELECT id, body, score FROM notes WHERE id = ?", &[1i64.into()])
            .await
            .unwrap()
            .expect("row");
        assert_eq!(row.get_by_name("id").unwrap(), DatabaseValue::Int64(1));
        assert_eq!(row.get_by_name("body").unwrap(), DatabaseValue::String("hello".into()));
        assert_eq!(row.get_by_name("score").unwrap(), DatabaseValue::Float64(1.5));
    }

    #[tokio::test]
    async fn test_insert_id_only_reported_for_inserts() {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        conn.execute("CREATE TABLE tags (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)", &[])
            .await
            .unwrap();

        let inserted = conn
            .execute("insert INTO tags (name) VALUES (?)", &["rust".into()])
            .await
            .unwrap();
        assert_eq!(inserted.last_insert_id(), Some(1));

        let updated = conn
            .execute("UPDATE tags SET name = ? WHERE id = ?", &["sqlx".into(), 1i64.into()])
            .await
            .unwrap();
        assert_eq!(updated.rows_affected(), 1);
        assert_eq!(updated.last_insert_id(), None);

        let deleted = conn.execute("DELETE FROM tags", &[]).await.unwrap();
        assert_eq!(deleted.rows_affected(), 1);
        assert_eq!(deleted.last_insert_id(), None);
    }

    #[test]
    fn test_connection_is_usable_as_boxed_trait_object() {
        fn assert_connection<T: DatabaseConnection + 'static>() {}
        assert_connection::<SqliteConnection>();

        let _: fn(SqliteConnection) -> Box<dyn DatabaseConnection> = |conn| Box::new(conn);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        conn.close().await.unwrap();
        conn.close().await.unwrap();

        let err = conn.execute("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, OrmError::Connection(_)));
    }
}
