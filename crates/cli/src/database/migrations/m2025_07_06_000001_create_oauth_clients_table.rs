use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct CreateOAuthClientsTable;

#[async_trait]
impl Migration for CreateOAuthClientsTable {
    fn name(&self) -> &str {
        "create_oauth_clients_table"
    }

    fn timestamp(&self) -> &str {
        "2025_07_06_000001"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("oauth_clients", |table| {
            table.increments("id");
            table.string("name", None);
            table.string("client_id", Some(100)).unique();
            table.string("client_secret", None);
            table.string("redirect_uri", None).nullable();
            table.string("grant_types", None).nullable();
            table.string("scopes", None).nullable();
            table.timestamp("created_at").use_current();
            table.timestamp("updated_at").use_current().on_update_current();
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("oauth_clients"), &[]).await?;
        Ok(())
    }
}
