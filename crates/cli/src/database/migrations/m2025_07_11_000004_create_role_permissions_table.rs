use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct CreateRolePermissionsTable;

#[async_trait]
impl Migration for CreateRolePermissionsTable {
    fn name(&self) -> &str {
        "create_role_permissions_table"
    }

    fn timestamp(&self) -> &str {
        "2025_07_11_000004"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("role_permissions", |table| {
            table.increments("id");
            table.unsigned_integer("role_id");
            table.unsigned_integer("permission_id");
            table.timestamp("created_at").use_current();
            table.timestamp("updated_at").use_current().on_update_current();

            table.foreign("role_id").references("id").on("roles").on_delete("CASCADE");
            table.foreign("permission_id").references("id").on("permissions").on_delete("CASCADE");

            table.unique(&["role_id", "permission_id"]);
            table.index("role_id");
            table.index("permission_id");
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("role_permissions"), &[]).await?;
        Ok(())
    }
}
