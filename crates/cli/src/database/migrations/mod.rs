//! Application schema, in the order it was introduced

mod m2024_01_01_000001_create_users_table;
mod m2025_07_06_000001_create_oauth_clients_table;
mod m2025_07_06_000002_create_oauth_tokens_table;
mod m2025_07_06_000003_create_oauth_scopes_table;
mod m2025_07_07_000001_create_password_resets_table;
mod m2025_07_11_000001_create_roles_table;
mod m2025_07_11_000002_create_permissions_table;
mod m2025_07_11_000003_create_user_roles_table;
mod m2025_07_11_000004_create_role_permissions_table;
mod m2025_07_11_000005_create_user_permissions_table;

pub use m2024_01_01_000001_create_users_table::CreateUsersTable;
pub use m2025_07_06_000001_create_oauth_clients_table::CreateOAuthClientsTable;
pub use m2025_07_06_000002_create_oauth_tokens_table::CreateOAuthTokensTable;
pub use m2025_07_06_000003_create_oauth_scopes_table::CreateOAuthScopesTable;
pub use m2025_07_07_000001_create_password_resets_table::CreatePasswordResetsTable;
pub use m2025_07_11_000001_create_roles_table::CreateRolesTable;
pub use m2025_07_11_000002_create_permissions_table::CreatePermissionsTable;
pub use m2025_07_11_000003_create_user_roles_table::CreateUserRolesTable;
pub use m2025_07_11_000004_create_role_permissions_table::CreateRolePermissionsTable;
pub use m2025_07_11_000005_create_user_permissions_table::CreateUserPermissionsTable;

use semita_orm::Migrator;

/// Register every application migration on `migrator`
pub fn register_all(migrator: &mut Migrator) -> &mut Migrator {
    migrator
        .register(CreateUsersTable)
        .register(CreatePasswordResetsTable)
        .register(CreateOAuthClientsTable)
        .register(CreateOAuthTokensTable)
        .register(CreateOAuthScopesTable)
        .register(CreateRolesTable)
        .register(CreatePermissionsTable)
        .register(CreateUserRolesTable)
        .register(CreateRolePermissionsTable)
        .register(CreateUserPermissionsTable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semita_orm::backends::{
        DatabaseConnection, DatabaseRow, DatabaseValue, QueryResult, SqlDialect,
    };
    use semita_orm::{Migration, OrmResult};

    /// Connection that records statements instead of running them
    #[derive(Default)]
    struct Recorder {
        statements: Vec<String>,
    }

    #[async_trait]
    impl DatabaseConnection for Recorder {
        async fn execute(
            &mut self,
            sql: &str,
            _params: &[DatabaseValue],
        ) -> OrmResult<QueryResult> {
            self.statements.push(sql.to_string());
            Ok(QueryResult::new(0, None))
        }

        async fn fetch_all(
            &mut self,
            _sql: &str,
            _params: &[DatabaseValue],
        ) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
            Ok(Vec::new())
        }

        async fn fetch_optional(
            &mut self,
            _sql: &str,
            _params: &[DatabaseValue],
        ) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
            Ok(None)
        }

        async fn close(&mut self) -> OrmResult<()> {
            Ok(())
        }

        fn dialect(&self) -> SqlDialect {
            SqlDialect::MySql
        }
    }

    async fn up_sql(migration: &dyn Migration) -> String {
        let mut recorder = Recorder::default();
        migration.up(&mut recorder).await.unwrap();
        assert_eq!(recorder.statements.len(), 1);
        recorder.statements.remove(0)
    }

    #[tokio::test]
    async fn test_users_table() {
        let sql = up_sql(&CreateUsersTable).await;

        assert!(sql.starts_with("CREATE TABLE users (\n\t"));
        assert!(sql.contains("id INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY"));
        assert!(sql.contains("language VARCHAR(10) NOT NULL DEFAULT 'en'"));
        assert!(sql.contains("\tavatar VARCHAR(255),\n"));
        assert!(sql.contains("\tremember_token VARCHAR(100),\n"));
        assert!(sql.contains(
            "updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"
        ));
        assert!(sql.contains("UNIQUE KEY (username)"));
        assert!(sql.contains("UNIQUE KEY (email)"));
    }

    #[tokio::test]
    async fn test_pivot_tables_reference_their_parents() {
        let sql = up_sql(&CreateUserRolesTable).await;

        assert!(sql.contains("FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE"));
        assert!(sql.contains("FOREIGN KEY (role_id) REFERENCES roles (id) ON DELETE CASCADE"));
        assert!(sql.contains("UNIQUE KEY unique_user_roles_user_id_role_id (user_id, role_id)"));
        assert!(sql.contains("KEY idx_user_roles_user_id (user_id)"));
    }

    #[tokio::test]
    async fn test_password_resets_has_composite_key() {
        let sql = up_sql(&CreatePasswordResetsTable).await;
        assert!(sql.trim_end().ends_with("PRIMARY KEY (email, token)\n);"));
    }

    #[tokio::test]
    async fn test_down_drops_the_table() {
        let mut recorder = Recorder::default();
        CreateOAuthTokensTable.down(&mut recorder).await.unwrap();
        assert_eq!(recorder.statements, vec!["DROP TABLE IF EXISTS oauth_tokens"]);
    }

    #[tokio::test]
    async fn test_registration_order_follows_timestamps() {
        let conn = semita_orm::connect("sqlite::memory:").await.unwrap();
        let mut migrator = Migrator::new(conn);
        register_all(&mut migrator);

        let ids = migrator.migration_ids();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], "2024_01_01_000001_create_users_table");
        assert_eq!(ids[1], "2025_07_06_000001_create_oauth_clients_table");
        assert_eq!(ids[4], "2025_07_07_000001_create_password_resets_table");
        assert_eq!(ids[9], "2025_07_11_000005_create_user_permissions_table");
    }
}
