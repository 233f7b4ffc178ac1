//! migrate, migrate:fresh, migrate:rollback and migrate:status

use anyhow::{bail, Context, Result};
use semita_core::AppConfig;
use semita_orm::{connect_with_config, MigrationConfig, MigrationStatus, Migrator};

use crate::database::migrations;

/// Connect and register the application migrations
async fn open(config: &AppConfig) -> Result<Migrator> {
    println!("🔌 Connecting to {}", config.database.masked_url());
    let conn = connect_with_config(&config.database)
        .await
        .context("Failed to connect to the database")?;

    let mut migrator = Migrator::with_config(conn, MigrationConfig::from(&config.database));
    migrations::register_all(&mut migrator);
    Ok(migrator)
}

async fn close(mut migrator: Migrator) {
    match migrator.close().await {
        Ok(()) => tracing::debug!("Database connection closed"),
        Err(e) => tracing::error!("Failed to close the database connection: {}", e),
    }
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut migrator = open(config).await?;
    let outcome = migrator.migrate().await;
    close(migrator).await;

    let result = outcome.context("Error running migrations")?;
    if result.applied.is_empty() {
        println!("Nothing to migrate");
        return Ok(());
    }

    for id in &result.applied {
        println!("✅ Migrated: {}", id);
    }
    println!(
        "Migrations completed successfully! ({} applied in {} ms)",
        result.applied.len(),
        result.execution_time_ms
    );
    Ok(())
}

pub async fn fresh(config: &AppConfig, force: bool) -> Result<()> {
    if config.environment.is_production() && !force {
        bail!("Refusing to drop every table in production; pass --force to continue");
    }

    let mut migrator = open(config).await?;
    println!("🗑️  Dropping all tables...");
    let outcome = migrator.fresh().await;
    close(migrator).await;

    let result = outcome.context("Error refreshing the database")?;
    for id in &result.applied {
        println!("✅ Migrated: {}", id);
    }
    println!("Database refreshed ({} migration(s) applied)", result.applied.len());
    Ok(())
}

pub async fn rollback(config: &AppConfig) -> Result<()> {
    let mut migrator = open(config).await?;
    let outcome = migrator.rollback().await;
    close(migrator).await;

    let result = outcome.context("Error rolling back migrations")?;
    match result.batch {
        None => println!("Nothing to rollback"),
        Some(batch) => {
            for id in &result.rolled_back {
                println!("↩️  Rolled back: {}", id);
            }
            println!("Rollback of batch {} completed successfully!", batch);
        }
    }
    Ok(())
}

pub async fn status(config: &AppConfig, json: bool) -> Result<()> {
    let mut migrator = open(config).await?;
    let outcome = migrator.status().await;
    close(migrator).await;

    let entries = outcome.context("Error reading migration status")?;
    println!("{}", render_status(&entries, json)?);
    Ok(())
}

fn render_status(entries: &[(String, MigrationStatus)], json: bool) -> Result<String> {
    if json {
        let rows: Vec<serde_json::Value> = entries
            .iter()
            .map(|(id, status)| serde_json::json!({ "migration": id, "status": status }))
            .collect();
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let mut lines = vec!["Migration Status:".to_string(), "================".to_string()];
    if entries.is_empty() {
        lines.push("No migrations registered".to_string());
    }
    for (id, status) in entries {
        lines.push(match status {
            MigrationStatus::Applied { batch } => format!("  ✅ {} (batch {})", id, batch),
            MigrationStatus::Pending => format!("  ⏳ {}", id),
        });
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use semita_core::AppConfigTrait;

    fn sqlite_config(env: &str) -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "APP_ENV" => Some(env.to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_render_status() {
        let entries = vec![
            (
                "2024_01_01_000001_create_users_table".to_string(),
                MigrationStatus::Applied { batch: 1 },
            ),
            ("2025_07_06_000001_create_oauth_clients_table".to_string(), MigrationStatus::Pending),
        ];

        let text = render_status(&entries, false).unwrap();
        assert!(text.contains("✅ 2024_01_01_000001_create_users_table (batch 1)"));
        assert!(text.contains("⏳ 2025_07_06_000001_create_oauth_clients_table"));

        let rendered = render_status(&entries, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json[0]["status"]["state"], "applied");
        assert_eq!(json[0]["status"]["batch"], 1);
        assert_eq!(json[1]["status"]["state"], "pending");
    }

    #[tokio::test]
    async fn test_status_and_rollback_on_empty_database() {
        let config = sqlite_config("development");
        status(&config, false).await.unwrap();
        rollback(&config).await.unwrap();
    }

    #[tokio::test]
    async fn test_fresh_requires_force_in_production() {
        let config = sqlite_config("production");
        let err = fresh(&config, false).await.unwrap_err();
        assert!(err.to_string().contains("--force"));
    }
}
