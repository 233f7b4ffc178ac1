//! db:seed and run:seed

use anyhow::{Context, Result};
use semita_core::AppConfig;
use semita_orm::{connect_with_config, SeederManager};

use crate::database::seeders;

async fn open(config: &AppConfig) -> Result<SeederManager> {
    println!("🔌 Connecting to {}", config.database.masked_url());
    let conn = connect_with_config(&config.database)
        .await
        .context("Failed to connect to the database")?;

    let mut manager = SeederManager::new(conn);
    seeders::register_all(&mut manager);
    Ok(manager)
}

async fn close(manager: SeederManager) {
    match manager.into_connection().close().await {
        Ok(()) => tracing::debug!("Database connection closed"),
        Err(e) => tracing::error!("Failed to close the database connection: {}", e),
    }
}

/// Run every registered seeder
pub async fn seed_all(config: &AppConfig) -> Result<()> {
    println!("=== Running All Seeders ===");

    let mut manager = open(config).await?;
    let outcome = manager.run_all_seeders().await;
    close(manager).await;

    let executed = outcome.context("Error running all seeders")?;
    report(&executed);
    println!("=== All Seeders Completed Successfully ===");
    Ok(())
}

/// Run one seeder after its dependencies
pub async fn seed_one(config: &AppConfig, name: &str) -> Result<()> {
    println!("=== Running Seeder: {} ===", name);

    let mut manager = open(config).await?;
    let outcome = manager.run_seeder(name).await;
    close(manager).await;

    let executed = outcome.with_context(|| format!("Error running seeder '{}'", name))?;
    report(&executed);
    println!("=== Seeder '{}' Completed Successfully ===", name);
    Ok(())
}

fn report(executed: &[String]) {
    for name in executed {
        println!("🌱 Seeded: {}", name);
    }
}
