//! # semita-orm: schema migrations and seeding
//!
//! A fluent table builder that renders `CREATE TABLE` statements, a versioned
//! migration runner with a ledger and batch rollback, and a dependency-aware
//! seeder manager. Everything runs over one [`DatabaseConnection`] handed in by
//! the caller; MySQL and SQLite backends are provided.

pub mod backends;
pub mod error;
pub mod migrations;
pub mod schema;
pub mod seeding;

pub use backends::{
    connect, connect_with_config, DatabaseConnection, DatabaseRow, DatabaseRowExt, DatabaseValue,
    QueryResult, SqlDialect,
};
pub use error::{MigrationPhase, OrmError, OrmResult};
pub use migrations::{
    Migration, MigrationConfig, MigrationRunResult, MigrationStatus, Migrator, RollbackResult,
    SqlMigration,
};
pub use schema::{Blueprint, Column, DefaultValue, Schema};
pub use seeding::{Seeder, SeederManager, SqlSeeder};
