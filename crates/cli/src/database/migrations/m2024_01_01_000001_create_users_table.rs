use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct CreateUsersTable;

#[async_trait]
impl Migration for CreateUsersTable {
    fn name(&self) -> &str {
        "create_users_table"
    }

    fn timestamp(&self) -> &str {
        "2024_01_01_000001"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("users", |table| {
            table.increments("id");
            table.string("first_name", None);
            table.string("last_name", None);
            table.string("username", None).unique().index();
            table.string("avatar", None).nullable();
            table.string("language", Some(10)).default("en");
            table.string("email", None).unique();
            table.date_time("email_verified_at").nullable();
            table.remember_token();
            table.string("password", None);
            table.timestamp("created_at").use_current();
            table.timestamp("updated_at").use_current().on_update_current();
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("users"), &[]).await?;
        Ok(())
    }
}
