//! Database Backend Abstractions
//!
//! The SQL execution handle, its MySQL and SQLite implementations, and the
//! dialect-specific administration the migrator and seeders need.

pub mod admin;
pub mod core;
pub mod mysql;
pub mod sqlite;

pub use admin::{
    schema_admin, with_foreign_key_checks_disabled, MySqlAdmin, SchemaAdmin, SqliteAdmin,
};
pub use self::core::*;
pub use mysql::MySqlConnection;
pub use sqlite::SqliteConnection;

use semita_core::DatabaseConfig;

use crate::error::OrmResult;

/// Open one connection, choosing the backend from the URL scheme
pub async fn connect(database_url: &str) -> OrmResult<Box<dyn DatabaseConnection>> {
    match SqlDialect::from_url(database_url)? {
        SqlDialect::MySql => Ok(Box::new(MySqlConnection::connect(database_url).await?)),
        SqlDialect::Sqlite => Ok(Box::new(SqliteConnection::connect(database_url).await?)),
    }
}

/// Open one connection described by the process configuration
pub async fn connect_with_config(
    config: &DatabaseConfig,
) -> OrmResult<Box<dyn DatabaseConnection>> {
    tracing::info!("Connecting to {}", config.masked_url());
    connect(&config.url()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;

    #[tokio::test]
    async fn test_connect_detects_backend() {
        let conn = connect("sqlite::memory:").await.unwrap();
        assert_eq!(conn.dialect(), SqlDialect::Sqlite);

        let err = connect("postgres://localhost/app").await.err().unwrap();
        assert!(matches!(err, OrmError::Configuration(_)));
    }
}
