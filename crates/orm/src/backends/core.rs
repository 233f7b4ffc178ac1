//! Core Database Backend Traits
//!
//! The SQL execution handle the engine runs against. Backends implement
//! [`DatabaseConnection`] over one live driver connection; the migrator and the
//! seeder manager only ever see the trait object.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{OrmError, OrmResult};

/// Boxed future borrowed from a connection, used by closures that run against it
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Abstract database connection trait
#[async_trait]
pub trait DatabaseConnection: Send {
    /// Execute a statement and return the affected row count and last insert id
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<QueryResult>;

    /// Execute a query and return the result rows
    async fn fetch_all(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>>;

    /// Execute a query and return the first result row
    async fn fetch_optional(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Option<Box<dyn DatabaseRow>>>;

    /// Close the connection. Closing twice is a no-op.
    async fn close(&mut self) -> OrmResult<()>;

    /// Dialect spoken by this connection
    fn dialect(&self) -> SqlDialect;
}

/// Outcome of a statement executed through [`DatabaseConnection::execute`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryResult {
    rows_affected: u64,
    last_insert_id: Option<i64>,
}

impl QueryResult {
    pub fn new(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }

    /// Number of rows changed by the statement
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Id generated by the last insert, when the driver reports one
    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }
}

/// Abstract database row trait
pub trait DatabaseRow: Send + Sync {
    /// Get a column value by index
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue>;

    /// Get a column value by name
    fn get_by_name(&self, name: &str) -> OrmResult<DatabaseValue>;

    /// Get column count
    fn column_count(&self) -> usize;

    /// Get column names
    fn column_names(&self) -> Vec<String>;

    /// Convert row to JSON value
    fn to_json(&self) -> OrmResult<JsonValue> {
        let mut map = serde_json::Map::new();
        for (index, name) in self.column_names().into_iter().enumerate() {
            map.insert(name, self.get_by_index(index)?.to_json());
        }
        Ok(JsonValue::Object(map))
    }

    /// Convert row to HashMap
    fn to_map(&self) -> OrmResult<HashMap<String, DatabaseValue>> {
        let mut map = HashMap::new();
        for (index, name) in self.column_names().into_iter().enumerate() {
            map.insert(name, self.get_by_index(index)?);
        }
        Ok(map)
    }
}

/// Extension trait for DatabaseRow to support typed column access
pub trait DatabaseRowExt {
    /// Get a typed value from a column
    fn get<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'de> serde::Deserialize<'de>;

    /// Try to get an optional typed value from a column; missing columns and NULL yield `None`
    fn try_get<T>(&self, column: &str) -> OrmResult<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>;
}

impl<R: DatabaseRow + ?Sized> DatabaseRowExt for R {
    fn get<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let value = self.get_by_name(column)?;
        serde_json::from_value(value.to_json())
            .map_err(|e| {
                OrmError::Query(format!("Failed to deserialize column '{}': {}", column, e))
            })
    }

    fn try_get<T>(&self, column: &str) -> OrmResult<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        if !self.column_names().iter().any(|name| name == column) {
            return Ok(None);
        }

        let value = self.get_by_name(column)?;
        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value.to_json())
            .map(Some)
            .map_err(|e| {
                OrmError::Query(format!("Failed to deserialize column '{}': {}", column, e))
            })
    }
}

/// Row decoded eagerly from a driver row.
///
/// Both backends materialise their rows into this shape so the boxed rows
/// outlive the driver borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    columns: Vec<String>,
    values: Vec<DatabaseValue>,
}

impl ResultRow {
    pub fn new(columns: Vec<String>, values: Vec<DatabaseValue>) -> Self {
        Self { columns, values }
    }
}

impl DatabaseRow for ResultRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| OrmError::Query(format!("Column index {} out of range", index)))
    }

    fn get_by_name(&self, name: &str) -> OrmResult<DatabaseValue> {
        let index = self
            .columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| OrmError::Query(format!("Column '{}' not found", name)))?;
        self.get_by_index(index)
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }
}

/// Database value enumeration for type-safe parameter binding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    DateTime(chrono::DateTime<chrono::Utc>),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    Json(JsonValue),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Integer view of the value; numeric strings are parsed
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DatabaseValue::Int32(i) => Some(*i as i64),
            DatabaseValue::Int64(i) => Some(*i),
            DatabaseValue::Bool(b) => Some(*b as i64),
            DatabaseValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text view of the value; byte strings are read as UTF-8
    pub fn as_text(&self) -> Option<String> {
        match self {
            DatabaseValue::String(s) => Some(s.clone()),
            DatabaseValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            DatabaseValue::Uuid(u) => Some(u.to_string()),
            DatabaseValue::Int32(i) => Some(i.to_string()),
            DatabaseValue::Int64(i) => Some(i.to_string()),
            _ => None,
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int32(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Int64(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::Array(
                b.iter()
                    .map(|&x| JsonValue::Number(serde_json::Number::from(x)))
                    .collect(),
            ),
            DatabaseValue::Uuid(u) => JsonValue::String(u.to_string()),
            DatabaseValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
            DatabaseValue::Date(d) => JsonValue::String(d.to_string()),
            DatabaseValue::Time(t) => JsonValue::String(t.to_string()),
            DatabaseValue::Json(j) => j.clone(),
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Int32(value)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(value: Vec<u8>) -> Self {
        DatabaseValue::Bytes(value)
    }
}

impl From<uuid::Uuid> for DatabaseValue {
    fn from(value: uuid::Uuid) -> Self {
        DatabaseValue::Uuid(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DatabaseValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        DatabaseValue::DateTime(value)
    }
}

impl From<chrono::NaiveDate> for DatabaseValue {
    fn from(value: chrono::NaiveDate) -> Self {
        DatabaseValue::Date(value)
    }
}

impl From<chrono::NaiveTime> for DatabaseValue {
    fn from(value: chrono::NaiveTime) -> Self {
        DatabaseValue::Time(value)
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::Json(value)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// SQL dialect enumeration for dialect-specific administration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlDialect {
    MySql,
    Sqlite,
}

impl SqlDialect {
    /// Detect the dialect from a connection URL scheme
    pub fn from_url(url: &str) -> OrmResult<Self> {
        if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Ok(SqlDialect::MySql)
        } else if url.starts_with("sqlite:") {
            Ok(SqlDialect::Sqlite)
        } else {
            Err(OrmError::Configuration(format!(
                "Unsupported database URL scheme: {}",
                url.split("://").next().unwrap_or(url)
            )))
        }
    }

    /// Quote an identifier for this dialect
    pub fn quote_identifier(&self, identifier: &str) -> String {
        match self {
            SqlDialect::MySql => format!("`{}`", identifier.replace('`', "``")),
            SqlDialect::Sqlite => format!("\"{}\"", identifier.replace('"', "\"\"")),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::MySql => write!(f, "mysql"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
        }
    }
}
