//! Migration System
//!
//! Timestamp-ordered, reversible schema steps tracked in a ledger table inside
//! the target database. Each `migrate` run that applies at least one step
//! records it under a new batch; `rollback` reverts the newest batch.

pub mod definitions;
pub mod fresh;
pub mod ledger;
pub mod rollback;
pub mod runner;

pub use definitions::{
    Migration, MigrationConfig, MigrationRecord, MigrationRunResult, MigrationStatus,
    RollbackResult, SqlMigration,
};
pub use fresh::drop_order;
pub use ledger::Ledger;
pub use runner::Migrator;
