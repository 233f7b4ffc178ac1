//! MySQL Backend Implementation
//!
//! One `sqlx` MySQL connection wrapped as a [`DatabaseConnection`].

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, MySql, Row, ValueRef};

use super::core::*;
use crate::error::{OrmError, OrmResult};

/// MySQL connection implementation
pub struct MySqlConnection {
    conn: Option<sqlx::MySqlConnection>,
}

impl MySqlConnection {
    /// Open a connection to a `mysql://` URL
    pub async fn connect(database_url: &str) -> OrmResult<Self> {
        let conn = sqlx::MySqlConnection::connect(database_url)
            .await
            .map_err(|e| OrmError::Connection(format!("Failed to connect to MySQL: {}", e)))?;

        tracing::debug!("Opened MySQL connection");
        Ok(Self { conn: Some(conn) })
    }

    fn live(&mut self) -> OrmResult<&mut sqlx::MySqlConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| OrmError::Connection("Connection is closed".to_string()))
    }
}

#[async_trait]
impl DatabaseConnection for MySqlConnection {
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<QueryResult> {
        let conn = self.live()?;
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let result = query.execute(&mut *conn).await?;
        let last_insert_id = match result.last_insert_id() {
            0 => None,
            id => i64::try_from(id).ok(),
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
                    OrmError::Connection(format!("Failed to close MySQL connection: {}", e))
                })?;
        }
        Ok(())
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::MySql
    }
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &DatabaseValue,
) -> Query<'q, MySql, MySqlArguments> {
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

fn materialize(row: &MySqlRow) -> OrmResult<ResultRow> {
    let columns: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let values = (0..columns.len())
        .map(|index| mysql_value_to_database_value(row, index))
        .collect::<OrmResult<Vec<_>>>()?;
    Ok(ResultRow::new(columns, values))
}

/// Convert a MySQL column value to DatabaseValue, trying the widest types first
fn mysql_value_to_database_value(row: &MySqlRow, index: usize) -> OrmResult<DatabaseValue> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(DatabaseValue::Null);
    }

    if let Ok(value) = row.try_get::<i64, _>(index) {
        return Ok(DatabaseValue::Int64(value));
    }
    if let Ok(value) = row.try_get::<u64, _>(index) {
        return Ok(match i64::try_from(value) {
            Ok(v) => DatabaseValue::Int64(v),
            Err(_) => DatabaseValue::String(value.to_string()),
        });
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Ok(DatabaseValue::Float64(value));
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Ok(DatabaseValue::String(value));
    }
    if let Ok(value) = row.try_get::<chrono::NaiveDateTime, _>(index) {
        return Ok(DatabaseValue::DateTime(value.and_utc()));
    }
    if let Ok(value) = row.try_get::<chrono::NaiveDate, _>(index) {
        return Ok(DatabaseValue::Date(value));
    }
    if let Ok(value) = row.try_get::<chrono::NaiveTime, _>(index) {
        return Ok(DatabaseValue::Time(value));
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
