//! Seeder trait and a ready-made SQL seeder

use async_trait::async_trait;

use crate::backends::{DatabaseConnection, DatabaseValue};
use crate::error::OrmResult;

/// Seeder trait for implementing database seeders
#[async_trait]
pub trait Seeder: Send + Sync {
    /// Get the seeder name used for lookup and ordering
    fn name(&self) -> &str;

    /// Seeders that must run before this one
    fn dependencies(&self) -> Vec<String> {
        vec![]
    }

    /// Tables emptied before `seed` runs
    fn tables(&self) -> Vec<String> {
        vec![]
    }

    /// Insert the seeder's rows
    async fn seed(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()>;
}

/// Seeder made of parameterised statements executed in order
#[derive(Debug, Clone)]
pub struct SqlSeeder {
    name: String,
    dependencies: Vec<String>,
    tables: Vec<String>,
    statements: Vec<(String, Vec<DatabaseValue>)>,
}

impl SqlSeeder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            tables: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn depends_on(mut self, dependencies: &[&str]) -> Self {
        self.dependencies = dependencies.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Tables owned by this seeder, cleaned in the given order
    pub fn owns(mut self, tables: &[&str]) -> Self {
        self.tables = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Append a statement with its bound parameters
    pub fn statement(mut self, sql: impl Into<String>, params: Vec<DatabaseValue>) -> Self {
        self.statements.push((sql.into(), params));
        self
    }
}

#[async_trait]
impl Seeder for SqlSeeder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn tables(&self) -> Vec<String> {
        self.tables.clone()
    }

    async fn seed(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        for (sql, params) in &self.statements {
            conn.execute(sql, params).await?;
        }
        Ok(())
    }
}
