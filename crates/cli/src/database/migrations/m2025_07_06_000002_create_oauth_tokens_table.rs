use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct CreateOAuthTokensTable;

#[async_trait]
impl Migration for CreateOAuthTokensTable {
    fn name(&self) -> &str {
        "create_oauth_tokens_table"
    }

    fn timestamp(&self) -> &str {
        "2025_07_06_000002"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("oauth_tokens", |table| {
            table.increments("id");
            table.unsigned_integer("user_id").nullable().index();
            table.unsigned_integer("client_id").index();
            table.string("access_token", Some(512)).unique();
            table.string("refresh_token", Some(512)).unique();
            table.string("scopes", None).nullable();
            table.boolean("revoked").default(false);
            table.date_time("expires_at");
            table.timestamp("created_at").use_current();
            table.timestamp("updated_at").use_current().on_update_current();

            table.foreign("user_id").references("id").on("users").on_delete("CASCADE");
            table.foreign("client_id").references("id").on("oauth_clients").on_delete("CASCADE");
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("oauth_tokens"), &[]).await?;
        Ok(())
    }
}
