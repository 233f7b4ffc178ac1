//! Roles, permissions and the grants between them

use std::collections::HashMap;

use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{OrmError, OrmResult, Seeder};

pub const NAME: &str = "roles_permissions_seeder";

const GUARD: &str = "web";

const PERMISSIONS: &[(&str, &str)] = &[
    ("create-users", "Create users"),
    ("edit-users", "Edit users"),
    ("delete-users", "Delete users"),
    ("view-users", "View users"),
    ("create-roles", "Create roles"),
    ("edit-roles", "Edit roles"),
    ("delete-roles", "Delete roles"),
    ("view-roles", "View roles"),
    ("assign-roles", "Assign roles"),
    ("create-permissions", "Create permissions"),
    ("edit-permissions", "Edit permissions"),
    ("delete-permissions", "Delete permissions"),
    ("view-permissions", "View permissions"),
    ("assign-permissions", "Assign permissions"),
    ("manage-posts", "Manage posts"),
    ("publish-posts", "Publish posts"),
    ("edit-posts", "Edit posts"),
    ("delete-posts", "Delete posts"),
    ("view-dashboard", "View the admin dashboard"),
    ("manage-settings", "Manage system settings"),
];

const ROLES: &[(&str, &str)] = &[
    ("super-admin", "Super administrator with every permission"),
    ("admin", "System administrator"),
    ("editor", "Content editor"),
    ("moderator", "Moderator"),
    ("user", "Regular user"),
];

const ADMIN_GRANTS: &[&str] = &[
    "create-users",
    "edit-users",
    "delete-users",
    "view-users",
    "create-roles",
    "edit-roles",
    "view-roles",
    "assign-roles",
    "view-permissions",
    "assign-permissions",
    "manage-posts",
    "publish-posts",
    "edit-posts",
    "delete-posts",
    "view-dashboard",
    "manage-settings",
];

const EDITOR_GRANTS: &[&str] = &[
    "view-users",
    "manage-posts",
    "publish-posts",
    "edit-posts",
    "view-dashboard",
];

const MODERATOR_GRANTS: &[&str] = &["view-users", "edit-posts", "view-dashboard"];

/// Permissions granted per role; `None` grants all of them
const GRANTS: &[(&str, Option<&[&str]>)] = &[
    ("super-admin", None),
    ("admin", Some(ADMIN_GRANTS)),
    ("editor", Some(EDITOR_GRANTS)),
    ("moderator", Some(MODERATOR_GRANTS)),
];

pub struct RolesPermissionsSeeder;

impl RolesPermissionsSeeder {
    async fn insert_named(
        conn: &mut dyn DatabaseConnection,
        table: &str,
        rows: &[(&str, &str)],
    ) -> OrmResult<HashMap<String, i64>> {
        let sql = format!(
            "INSERT INTO {} (name, guard_name, description) VALUES (?, ?, ?)",
            table
        );

        let mut ids = HashMap::with_capacity(rows.len());
        for (name, description) in rows {
            let result = conn
                .execute(&sql, &[(*name).into(), GUARD.into(), (*description).into()])
                .await?;
            let id = result
                .last_insert_id()
                .ok_or_else(|| {
                    OrmError::seeder(NAME, format!("no id returned for {} '{}'", table, name))
                })?;
            tracing::debug!("Created {} row: {} (ID: {})", table, name, id);
            ids.insert(name.to_string(), id);
        }
        Ok(ids)
    }
}

#[async_trait]
impl Seeder for RolesPermissionsSeeder {
    fn name(&self) -> &str {
        NAME
    }

    fn tables(&self) -> Vec<String> {
        ["role_permissions", "user_roles", "user_permissions", "roles", "permissions"]
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    async fn seed(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let permissions = Self::insert_named(conn, "permissions", PERMISSIONS).await?;
        let roles = Self::insert_named(conn, "roles", ROLES).await?;

        for (role, granted) in GRANTS {
            let role_id = roles
                .get(*role)
                .copied()
                .ok_or_else(|| OrmError::seeder(NAME, format!("unknown role '{}'", role)))?;
            let names: Vec<&str> = match granted {
                Some(names) => names.to_vec(),
                None => PERMISSIONS.iter().map(|(name, _)| *name).collect(),
            };

            for name in &names {
                let permission_id = permissions
                    .get(*name)
                    .copied()
                    .ok_or_else(|| {
                        OrmError::seeder(NAME, format!("unknown permission '{}'", name))
                    })?;
                conn.execute(
                    "INSERT INTO role_permissions (role_id, permission_id) VALUES (?, ?)",
                    &[role_id.into(), permission_id.into()],
                )
                .await?;
            }
            tracing::info!("Assigned {} permission(s) to role '{}'", names.len(), role);
        }

        Ok(())
    }
}
