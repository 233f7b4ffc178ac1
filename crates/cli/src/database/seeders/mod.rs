//! Application seed data

pub mod roles_permissions_seeder;
pub mod users_seeder;

pub use roles_permissions_seeder::RolesPermissionsSeeder;
pub use users_seeder::UsersSeeder;

use semita_orm::SeederManager;

/// Register every application seeder on `manager`
pub fn register_all(manager: &mut SeederManager) -> &mut SeederManager {
    manager
        .register_seeder(RolesPermissionsSeeder)
        .register_seeder(UsersSeeder::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semita_orm::backends::DatabaseConnection;

    const SCHEMA: &[&str] = &[
        "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         first_name TEXT, last_name TEXT, \
         username TEXT UNIQUE, email TEXT UNIQUE, password TEXT)",
        "CREATE TABLE roles (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         name TEXT UNIQUE, guard_name TEXT, description TEXT)",
        "CREATE TABLE permissions (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         name TEXT UNIQUE, guard_name TEXT, description TEXT)",
        "CREATE TABLE user_roles (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         user_id INTEGER REFERENCES users (id) ON DELETE CASCADE, \
         role_id INTEGER REFERENCES roles (id) ON DELETE CASCADE)",
        "CREATE TABLE role_permissions (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         role_id INTEGER REFERENCES roles (id) ON DELETE CASCADE, \
         permission_id INTEGER REFERENCES permissions (id) ON DELETE CASCADE)",
        "CREATE TABLE user_permissions (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         user_id INTEGER REFERENCES users (id) ON DELETE CASCADE, \
         permission_id INTEGER REFERENCES permissions (id) ON DELETE CASCADE)",
    ];

    async fn manager() -> SeederManager {
        let mut conn = semita_orm::connect("sqlite::memory:").await.unwrap();
        for statement in SCHEMA {
            conn.execute(statement, &[]).await.unwrap();
        }

        let mut manager = SeederManager::new(conn);
        manager
            .register_seeder(RolesPermissionsSeeder)
            .register_seeder(UsersSeeder::with_cost(4));
        manager
    }

    async fn count(conn: &mut dyn DatabaseConnection, table: &str) -> i64 {
        let row = conn
            .fetch_optional(&format!("SELECT COUNT(*) FROM {}", table), &[])
            .await
            .unwrap()
            .unwrap();
        row.get_by_index(0).unwrap().as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_users_seed_after_roles() {
        let mut manager = manager().await;

        let executed = manager.run_seeder(users_seeder::NAME).await.unwrap();
        assert_eq!(executed, vec![roles_permissions_seeder::NAME, users_seeder::NAME]);

        let conn = manager.connection();
        assert_eq!(count(conn, "permissions").await, 20);
        assert_eq!(count(conn, "roles").await, 5);
        // super-admin 20, admin 16, editor 5, moderator 3
        assert_eq!(count(conn, "role_permissions").await, 44);
        assert_eq!(count(conn, "users").await, 8);
        assert_eq!(count(conn, "user_roles").await, 8);
    }

    #[tokio::test]
    async fn test_seeding_twice_does_not_duplicate() {
        let mut manager = manager().await;

        manager.run_all_seeders().await.unwrap();
        manager.run_all_seeders().await.unwrap();

        let conn = manager.connection();
        assert_eq!(count(conn, "roles").await, 5);
        assert_eq!(count(conn, "users").await, 8);
        assert_eq!(count(conn, "user_roles").await, 8);
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let mut manager = manager().await;
        manager.run_all_seeders().await.unwrap();

        let row = manager
            .connection()
            .fetch_optional("SELECT password FROM users WHERE username = ?", &["admin".into()])
            .await
            .unwrap()
            .unwrap();
        let hash = row.get_by_index(0).unwrap().as_text().unwrap();

        assert_ne!(hash, "12345678aA");
        assert!(bcrypt::verify("12345678aA", &hash).unwrap());
    }
}
