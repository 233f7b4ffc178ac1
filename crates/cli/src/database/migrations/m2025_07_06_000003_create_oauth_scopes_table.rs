use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct CreateOAuthScopesTable;

#[async_trait]
impl Migration for CreateOAuthScopesTable {
    fn name(&self) -> &str {
        "create_oauth_scopes_table"
    }

    fn timestamp(&self) -> &str {
        "2025_07_06_000003"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("oauth_scopes", |table| {
            table.increments("id");
            table.string("name", Some(100)).unique();
            table.string("description", None).nullable();
            table.timestamp("created_at").use_current();
            table.timestamp("updated_at").use_current().on_update_current();
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("oauth_scopes"), &[]).await?;
        Ok(())
    }
}
