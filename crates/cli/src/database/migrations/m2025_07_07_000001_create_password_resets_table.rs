use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct CreatePasswordResetsTable;

#[async_trait]
impl Migration for CreatePasswordResetsTable {
    fn name(&self) -> &str {
        "create_password_resets_table"
    }

    fn timestamp(&self) -> &str {
        "2025_07_07_000001"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("password_resets", |table| {
            table.string("email", None);
            table.string("token", None);
            table.date_time("created_at");

            table.primary(&["email", "token"]);
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("password_resets"), &[]).await?;
        Ok(())
    }
}
