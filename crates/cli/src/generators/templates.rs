pub const MIGRATION_TEMPLATE: &str = r#"use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{Migration, OrmResult, Schema};

pub struct {{ struct_name }};

#[async_trait]
impl Migration for {{ struct_name }} {
    fn name(&self) -> &str {
        "{{ migration_name }}"
    }

    fn timestamp(&self) -> &str {
        "{{ timestamp }}"
    }

    async fn up(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        let sql = Schema::create("{{ table_name }}", |table| {
            table.increments("id");
            table.timestamp("created_at").use_current();
            table.timestamp("updated_at").use_current().on_update_current();
        });
        conn.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        conn.execute(&Schema::drop_if_exists("{{ table_name }}"), &[]).await?;
        Ok(())
    }
}
"#;

pub const SEEDER_TEMPLATE: &str = r#"use async_trait::async_trait;
use semita_orm::backends::DatabaseConnection;
use semita_orm::{OrmResult, Seeder};

pub const NAME: &str = "{{ seeder_name }}";

pub struct {{ struct_name }};

#[async_trait]
impl Seeder for {{ struct_name }} {
    fn name(&self) -> &str {
        NAME
    }

    fn dependencies(&self) -> Vec<String> {
        vec![]
    }

    fn tables(&self) -> Vec<String> {
        vec!["{{ table_name }}".to_string()]
    }

    async fn seed(&self, _conn: &mut dyn DatabaseConnection) -> OrmResult<()> {
        tracing::info!("Seeding {{ table_name }}...");
        Ok(())
    }
}
"#;
