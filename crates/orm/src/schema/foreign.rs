//! Foreign key constraints

use super::blueprint::Blueprint;

/// A foreign key from a local column to a column of another table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl ForeignKey {
    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.column, self.referenced_table, self.referenced_column
        );
        if let Some(action) = &self.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action));
        }
        if let Some(action) = &self.on_update {
            sql.push_str(&format!(" ON UPDATE {}", action));
        }
        sql
    }
}

/// Accumulates the referenced side of a foreign key.
///
/// The key is added to the blueprint when the builder goes out of scope, so
/// `t.foreign("role_id").references("id").on("roles");` records it at the end
/// of the statement whether or not any action was set.
pub struct ForeignKeyBuilder<'a> {
    blueprint: &'a mut Blueprint,
    key: ForeignKey,
}

impl<'a> ForeignKeyBuilder<'a> {
    pub(crate) fn new(blueprint: &'a mut Blueprint, column: &str) -> Self {
        Self {
            blueprint,
            key: ForeignKey {
                column: column.to_string(),
                ..ForeignKey::default()
            },
        }
    }

    /// Referenced column
    pub fn references(&mut self, column: &str) -> &mut Self {
        self.key.referenced_column = column.to_string();
        self
    }

    /// Referenced table
    pub fn on(&mut self, table: &str) -> &mut Self {
        self.key.referenced_table = table.to_string();
        self
    }

    pub fn on_delete(&mut self, action: &str) -> &mut Self {
        self.key.on_delete = Some(action.to_string());
        self
    }

    pub fn on_update(&mut self, action: &str) -> &mut Self {
        self.key.on_update = Some(action.to_string());
        self
    }
}

impl Drop for ForeignKeyBuilder<'_> {
    fn drop(&mut self) {
        self.blueprint.foreign.push(std::mem::take(&mut self.key));
    }
}
