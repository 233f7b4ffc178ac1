use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct CreateUserPermissionsTable;

#[async_trait]
impl Migration for CreateUserPermissionsTable {
    fn name(&self) -> &str {
        "create_user_permissions_table"
    }

    fn timestamp(&self) -> &str {
        "2025_07_11_000005"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("user_permissions", |table| {
            table.increments("id");
            table.unsigned_integer("user_id");
            table.unsigned_integer("permission_id");
            table.timestamp("created_at").use_current();
            table.timestamp("updated_at").use_current().on_update_current();

            table.foreign("user_id").references("id").on("users").on_delete("CASCADE");
            table.foreign("permission_id").references("id").on("permissions").on_delete("CASCADE");

            table.unique(&["user_id", "permission_id"]);
            table.index("user_id");
            table.index("permission_id");
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("user_permissions"), &[]).await?;
        Ok(())
    }
}
