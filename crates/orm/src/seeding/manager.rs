//! Seeder manager - dependency-ordered, idempotent seeding
//!
//! Before a seeder runs, the tables it owns are emptied with foreign-key
//! checks disabled, so running the same seeders again yields the same rows.

use std::collections::{BTreeMap, BTreeSet};

use super::seeder::Seeder;
use crate::backends::{with_foreign_key_checks_disabled, DatabaseConnection};
use crate::error::{OrmError, OrmResult};

/// Seeder manager for running registered seeders
pub struct SeederManager {
    conn: Box<dyn DatabaseConnection>,
    seeders: BTreeMap<String, Box<dyn Seeder>>,
}

impl SeederManager {
    pub fn new(conn: Box<dyn DatabaseConnection>) -> Self {
        Self {
            conn,
            seeders: BTreeMap::new(),
        }
    }

    /// Register a seeder; a later seeder with the same name wins
    pub fn register_seeder<S: Seeder + 'static>(&mut self, seeder: S) -> &mut Self {
        self.register_boxed(Box::new(seeder))
    }

    pub fn register_boxed(&mut self, seeder: Box<dyn Seeder>) -> &mut Self {
        let name = seeder.name().to_string();
        if self.seeders.insert(name.clone(), seeder).is_some() {
            tracing::debug!("Seeder '{}' replaced", name);
        } else {
            tracing::debug!("Seeder '{}' registered", name);
        }
        self
    }

    pub fn get_seeder(&self, name: &str) -> OrmResult<&dyn Seeder> {
        self.seeders
            .get(name)
            .map(|s| s.as_ref())
            .ok_or_else(|| OrmError::SeederNotFound(name.to_string()))
    }

    /// Registered names in alphabetical order
    pub fn seeder_names(&self) -> Vec<String> {
        self.seeders.keys().cloned().collect()
    }

    /// Borrow the underlying connection
    pub fn connection(&mut self) -> &mut dyn DatabaseConnection {
        self.conn.as_mut()
    }

    pub fn into_connection(self) -> Box<dyn DatabaseConnection> {
        self.conn
    }

    /// Run one seeder after its dependencies. Returns the executed names.
    pub async fn run_seeder(&mut self, name: &str) -> OrmResult<Vec<String>> {
        let order = self.resolve_order(&[name.to_string()])?;
        self.run_ordered(order).await
    }

    /// Run every registered seeder once, dependencies first. Returns the executed names.
    pub async fn run_all_seeders(&mut self) -> OrmResult<Vec<String>> {
        let order = self.resolve_order(&self.seeder_names())?;
        self.run_ordered(order).await
    }

    /// Execution order for `roots` and everything they depend on.
    ///
    /// Kahn's algorithm over the reachable subgraph; ties go to the
    /// alphabetically first name.
    pub fn resolve_order(&self, roots: &[String]) -> OrmResult<Vec<String>> {
        // name -> its distinct dependencies, for every reachable seeder
        let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut stack: Vec<String> = roots.to_vec();

        while let Some(name) = stack.pop() {
            if graph.contains_key(&name) {
                continue;
            }
            let seeder = self.get_seeder(&name)?;
            let dependencies: BTreeSet<String> = seeder.dependencies().into_iter().collect();
            stack.extend(dependencies.iter().cloned());
            graph.insert(name, dependencies);
        }

        let mut pending: BTreeMap<&str, usize> = graph
            .iter()
            .map(|(name, deps)| (name.as_str(), deps.len()))
            .collect();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, deps) in &graph {
            for dep in deps {
                dependents.entry(dep.as_str()).or_default().push(name.as_str());
            }
        }

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut order = Vec::with_capacity(graph.len());

        while let Some(name) = ready.pop_first() {
            order.push(name.to_string());
            pending.remove(name);
            for dependent in dependents.get(name).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if !pending.is_empty() {
            return Err(OrmError::CircularDependency(cycle_members(&graph, &pending)));
        }

        Ok(order)
    }

    async fn run_ordered(&mut self, order: Vec<String>) -> OrmResult<Vec<String>> {
        for name in &order {
            let seeder = self
                .seeders
                .get(name)
                .ok_or_else(|| OrmError::SeederNotFound(name.clone()))?;

            tracing::info!("Running seeder: {}", name);
            clean_tables(self.conn.as_mut(), name, seeder.tables()).await;

            seeder
                .seed(self.conn.as_mut())
                .await
                .map_err(|e| OrmError::seeder(name.as_str(), e))?;

            tracing::info!("Seeder '{}' executed successfully", name);
        }
        Ok(order)
    }
}

/// Unresolved seeders that sit on a cycle: repeatedly discard the ones no other
/// unresolved seeder depends on.
fn cycle_members(
    graph: &BTreeMap<String, BTreeSet<String>>,
    pending: &BTreeMap<&str, usize>,
) -> Vec<String> {
    let mut members: BTreeSet<&str> = pending.keys().copied().collect();
    loop {
        let needed: BTreeSet<&str> = members
            .iter()
            .flat_map(|name| graph.get(*name).into_iter().flatten())
            .map(String::as_str)
            .filter(|dep| members.contains(dep))
            .collect();
        let before = members.len();
        members.retain(|name| needed.contains(name));
        if members.len() == before {
            break;
        }
    }
    members.into_iter().map(str::to_string).collect()
}

/// Empty a seeder's tables. Failures are logged and skipped.
async fn clean_tables(conn: &mut dyn DatabaseConnection, seeder: &str, tables: Vec<String>) {
    if tables.is_empty() {
        tracing::debug!("No tables specified for seeder '{}', skipping cleanup", seeder);
        return;
    }

    tracing::debug!("Cleaning tables for seeder '{}': {:?}", seeder, tables);

    let cleaned = with_foreign_key_checks_disabled(conn, move |conn| {
        Box::pin(async move {
            for table in &tables {
                match conn.execute(&format!("DELETE FROM {}", table), &[]).await {
                    Ok(_) => tracing::debug!("Cleaned table: {}", table),
                    Err(e) => tracing::warn!("Error cleaning table '{}': {}", table, e),
                }
            }
            Ok(())
        })
    })
    .await;

    if let Err(e) = cleaned {
        tracing::warn!("Cleanup for seeder '{}' did not complete: {}", seeder, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::SqliteConnection;
    use crate::seeding::SqlSeeder;

    async fn manager_with(seeders: Vec<SqlSeeder>) -> SeederManager {
        let conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        let mut manager = SeederManager::new(Box::new(conn));
        for seeder in seeders {
            manager.register_seeder(seeder);
        }
        manager
    }

    #[tokio::test]
    async fn test_dependencies_come_first_and_once() {
        let manager = manager_with(vec![
            SqlSeeder::new("users").depends_on(&["roles", "permissions"]),
            SqlSeeder::new("roles").depends_on(&["permissions"]),
            SqlSeeder::new("permissions"),
            SqlSeeder::new("articles").depends_on(&["users"]),
        ])
        .await;

        let order = manager.resolve_order(&manager.seeder_names()).unwrap();
        assert_eq!(order, vec!["permissions", "roles", "users", "articles"]);

        let order = manager.resolve_order(&["roles".to_string()]).unwrap();
        assert_eq!(order, vec!["permissions", "roles"]);
    }

    #[tokio::test]
    async fn test_cycle_is_reported_by_name() {
        let manager = manager_with(vec![
            SqlSeeder::new("a").depends_on(&["b"]),
            SqlSeeder::new("b").depends_on(&["a"]),
            SqlSeeder::new("c").depends_on(&["a"]),
            SqlSeeder::new("d"),
        ])
        .await;

        let err = manager.resolve_order(&manager.seeder_names()).unwrap_err();
        match err {
            OrmError::CircularDependency(members) => assert_eq!(members, vec!["a", "b"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_names_fail() {
        let mut manager = manager_with(vec![SqlSeeder::new("users").depends_on(&["roles"])]).await;

        assert!(matches!(
            manager.run_seeder("users").await,
            Err(OrmError::SeederNotFound(name)) if name == "roles"
        ));
        assert!(matches!(
            manager.run_seeder("missing").await,
            Err(OrmError::SeederNotFound(name)) if name == "missing"
        ));
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let manager = manager_with(vec![
            SqlSeeder::new("users").depends_on(&["roles"]),
            SqlSeeder::new("users"),
        ])
        .await;

        assert!(manager.get_seeder("users").unwrap().dependencies().is_empty());
        assert_eq!(manager.seeder_names(), vec!["users"]);
    }
}
