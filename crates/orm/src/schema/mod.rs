//! Schema Builder - fluent table definitions compiled to DDL
//!
//! ```
//! use semita_orm::schema::Schema;
//!
//! let sql = Schema::create("users", |t| {
//!     t.id();
//!     t.string("email", None).unique();
//!     t.boolean("active").default(true);
//!     t.timestamps();
//! });
//! assert!(sql.starts_with("CREATE TABLE users ("));
//! ```

pub mod blueprint;
pub mod column;
pub mod foreign;

pub use blueprint::{Blueprint, Index, IndexKind};
pub use column::{Column, ColumnType, DefaultValue};
pub use foreign::{ForeignKey, ForeignKeyBuilder};

/// Entry point for table-level DDL
pub struct Schema;

impl Schema {
    /// Build a table definition and render its `CREATE TABLE` statement
    pub fn create<F>(table: &str, callback: F) -> String
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = Blueprint::new(table);
        callback(&mut blueprint);
        blueprint.to_sql()
    }

    /// `DROP TABLE IF EXISTS <table>`
    pub fn drop(table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", table)
    }

    /// Same statement as [`Schema::drop`]
    pub fn drop_if_exists(table: &str) -> String {
        Self::drop(table)
    }

    /// `RENAME TABLE <from> TO <to>`
    pub fn rename(from: &str, to: &str) -> String {
        format!("RENAME TABLE {} TO {}", from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_drop() {
        let sql = Schema::create("password_resets", |t| {
            t.string("email", None);
            t.string("token", None);
            t.timestamp("created_at").nullable();
            t.primary(&["email", "token"]);
        });

        assert_eq!(
            sql,
            "CREATE TABLE password_resets (\n\
             \temail VARCHAR(255) NOT NULL,\n\
             \ttoken VARCHAR(255) NOT NULL,\n\
             \tcreated_at TIMESTAMP,\n\
             \tPRIMARY KEY (email, token)\n\
             );"
        );
        assert_eq!(Schema::drop("password_resets"), "DROP TABLE IF EXISTS password_resets");
        assert_eq!(Schema::rename("a", "b"), "RENAME TABLE a TO b");
    }
}
