//! Fresh - drop every table and migrate from scratch

use std::collections::{BTreeMap, BTreeSet};

use super::definitions::MigrationRunResult;
use super::runner::Migrator;
use crate::backends::{schema_admin, with_foreign_key_checks_disabled};
use crate::error::OrmResult;

impl Migrator {
    /// Drop every table except the ledger, recreate the ledger, and run all
    /// migrations again.
    ///
    /// Tables are dropped children-first using the database's foreign keys,
    /// with foreign-key checks disabled for the duration.
    pub async fn fresh(&mut self) -> OrmResult<MigrationRunResult> {
        let ledger_table = self.ledger.table().to_string();

        let dropped = with_foreign_key_checks_disabled(self.conn.as_mut(), move |conn| {
            Box::pin(async move {
                let admin = schema_admin(conn.dialect());
                let tables = admin.list_tables(&mut *conn).await?;
                let edges = admin.foreign_keys(&mut *conn).await?;

                let order = drop_order(&tables, &edges, &ledger_table);
                for table in &order {
                    tracing::debug!("Dropping table {}", table);
                    conn.execute(&admin.drop_table_sql(table), &[]).await?;
                }
                Ok(order)
            })
        })
        .await?;

        tracing::info!("Dropped {} table(s)", dropped.len());

        self.ledger.drop_table(self.conn.as_mut()).await?;
        self.ledger.ensure_table(self.conn.as_mut()).await?;
        self.migrate().await
    }
}

/// Order in which `tables` can be dropped so that every table goes before the
/// tables it references. Tables caught in a reference cycle come last, by name.
pub fn drop_order(
    tables: &[String],
    edges: &[(String, String)],
    ledger_table: &str,
) -> Vec<String> {
    let names: BTreeSet<&str> = tables
        .iter()
        .map(String::as_str)
        .filter(|t| *t != ledger_table)
        .collect();

    // referenced table -> number of distinct tables still referencing it
    let mut referenced_by: BTreeMap<&str, usize> = names.iter().map(|t| (*t, 0)).collect();
    let mut references: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for (child, parent) in edges {
        let (child, parent) = (child.as_str(), parent.as_str());
        if child == parent || !names.contains(child) || !names.contains(parent) {
            continue;
        }
        if references.entry(child).or_default().insert(parent) {
            if let Some(count) = referenced_by.get_mut(parent) {
                *count += 1;
            }
        }
    }

    let mut ready: BTreeSet<&str> = referenced_by
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order = Vec::with_capacity(names.len());

    while let Some(table) = ready.pop_first() {
        order.push(table.to_string());
        if let Some(parents) = references.get(table) {
            for parent in parents {
                if let Some(count) = referenced_by.get_mut(parent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(*parent);
                    }
                }
            }
        }
    }

    for name in &names {
        if !order.iter().any(|t| t == name) {
            order.push(name.to_string());
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn edge(child: &str, parent: &str) -> (String, String) {
        (child.to_string(), parent.to_string())
    }

    #[test]
    fn test_children_dropped_before_parents() {
        let tables = strings(&[
            "migrations",
            "oauth_clients",
            "oauth_tokens",
            "roles",
            "user_roles",
            "users",
        ]);
        let edges = vec![
            edge("oauth_tokens", "oauth_clients"),
            edge("oauth_tokens", "users"),
            edge("user_roles", "users"),
            edge("user_roles", "roles"),
        ];

        let order = drop_order(&tables, &edges, "migrations");
        let position = |name: &str| order.iter().position(|t| t == name).unwrap();

        assert!(!order.contains(&"migrations".to_string()));
        assert_eq!(order.len(), 5);
        assert!(position("oauth_tokens") < position("oauth_clients"));
        assert!(position("oauth_tokens") < position("users"));
        assert!(position("user_roles") < position("roles"));
        assert!(position("user_roles") < position("users"));
    }

    #[test]
    fn test_name_containing_token_is_not_special() {
        let tables = strings(&["tokenized_items", "items"]);
        let edges = vec![edge("items", "tokenized_items")];
        assert_eq!(
            drop_order(&tables, &edges, "migrations"),
            strings(&["items", "tokenized_items"])
        );
    }

    #[test]
    fn test_cycles_and_self_references_fall_back_to_name_order() {
        let tables = strings(&["a", "b", "c", "tree"]);
        let edges = vec![edge("a", "b"), edge("b", "a"), edge("tree", "tree"), edge("c", "a")];
        assert_eq!(drop_order(&tables, &edges, "migrations"), strings(&["c", "tree", "a", "b"]));
    }
}
