//! Demo accounts, one per role

use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{OrmError, OrmResult, Seeder};

use super::roles_permissions_seeder;

pub const NAME: &str = "users_seeder";

const DEFAULT_PASSWORD: &str = "12345678aA";

struct DemoUser {
    first_name: &'static str,
    last_name: &'static str,
    username: &'static str,
    email: &'static str,
    role: &'static str,
}

const fn demo(
    first_name: &'static str,
    last_name: &'static str,
    username: &'static str,
    email: &'static str,
    role: &'static str,
) -> DemoUser {
    DemoUser {
        first_name,
        last_name,
        username,
        email,
        role,
    }
}

const USERS: &[DemoUser] = &[
    demo("Super", "Admin", "superadmin", "superadmin@example.com", "super-admin"),
    demo("Admin", "User", "admin", "admin@example.com", "admin"),
    demo("Editor", "Principal", "editor", "editor@example.com", "editor"),
    demo("Moderator", "00", "moderator", "moderator@example.com", "moderator"),
    demo("Regular", "User", "user", "user@example.com", "user"),
    demo("Maria", "Garcia", "maria.garcia", "maria.garcia@example.com", "user"),
    demo("Carlos", "Lopez", "carlos.lopez", "carlos.lopez@example.com", "user"),
    demo("Ana", "Martinez", "ana.martinez", "ana.martinez@example.com", "editor"),
];

pub struct UsersSeeder {
    cost: u32,
}

impl UsersSeeder {
    pub fn new() -> Self {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }

    /// Hash the shared password with a custom bcrypt cost
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    async fn role_id(conn: &mut dyn DatabaseConnection, role: &str) -> OrmResult<i64> {
        let row = conn
            .fetch_optional(
                "SELECT id FROM roles WHERE name = ? AND guard_name = 'web'",
                &[role.into()],
            )
            .await?
            .ok_or_else(|| OrmError::seeder(NAME, format!("role '{}' does not exist", role)))?;

        row.get_by_index(0)?
            .as_i64()
            .ok_or_else(|| OrmError::seeder(NAME, format!("role '{}' has a non-integer id", role)))
    }
}

impl Default for UsersSeeder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Seeder for UsersSeeder {
    fn name(&self) -> &str {
        NAME
    }

    fn dependencies(&self) -> Vec<String> {
        vec![roles_permissions_seeder::NAME.to_string()]
    }

    fn tables(&self) -> Vec<String> {
        ["user_permissions", "user_roles", "users"]
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    async fn seed(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let password =
            bcrypt::hash(DEFAULT_PASSWORD, self.cost).map_err(|e| OrmError::seeder(NAME, e))?;

        for user in USERS {
            let result = conn
                .execute(
                    "INSERT INTO users (first_name, last_name, username, email, password) \
                     VALUES (?, ?, ?, ?, ?)",
                    &[
                        user.first_name.into(),
                        user.last_name.into(),
                        user.username.into(),
                        user.email.into(),
                        password.as_str().into(),
                    ],
                )
                .await?;
            let user_id = result
                .last_insert_id()
                .ok_or_else(|| {
                    OrmError::seeder(NAME, format!("no id returned for user '{}'", user.email))
                })?;

            let role_id = Self::role_id(conn, user.role).await?;
            conn.execute(
                "INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)",
                &[user_id.into(), role_id.into()],
            )
            .await?;

            tracing::info!("Created user {} with role '{}'", user.email, user.role);
        }

        Ok(())
    }
}
