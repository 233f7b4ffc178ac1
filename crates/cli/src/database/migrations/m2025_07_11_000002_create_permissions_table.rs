use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct CreatePermissionsTable;

#[async_trait]
impl Migration for CreatePermissionsTable {
    fn name(&self) -> &str {
        "create_permissions_table"
    }

    fn timestamp(&self) -> &str {
        "2025_07_11_000002"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("permissions", |table| {
            table.increments("id");
            table.string("name", None).unique();
            table.string("guard_name", None).default("web");
            table.text("description").nullable();
            table.timestamp("created_at").use_current();
            table.timestamp("updated_at").use_current().on_update_current();

            table.index("name");
            table.index("guard_name");
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("permissions"), &[]).await?;
        Ok(())
    }
}
