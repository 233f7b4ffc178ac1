mod commands;
mod database;
mod generators;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use semita_core::{init_logging, AppConfig, AppConfigTrait, LoggingConfig};

#[derive(Parser)]
#[command(name = "semita")]
#[command(about = "Database migrations and seeders")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all pending migrations
    Migrate,

    /// Drop every table and run all migrations again
    #[command(name = "migrate:fresh")]
    MigrateFresh {
        /// Allow running in production
        #[arg(long)]
        force: bool,
    },

    /// Roll back the last batch of migrations
    #[command(name = "migrate:rollback")]
    MigrateRollback,

    /// Show which migrations have been applied
    #[command(name = "migrate:status")]
    MigrateStatus {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new migration file
    #[command(name = "make:migration")]
    MakeMigration {
        /// Migration name, e.g. create_posts_table
        name: String,

        /// Directory to write the migration to
        #[arg(long, default_value = "database/migrations")]
        path: PathBuf,
    },

    /// Create a new seeder file
    #[command(name = "make:seeder")]
    MakeSeeder {
        /// Seeder name, e.g. categories
        name: String,

        /// Directory to write the seeder to
        #[arg(long, default_value = "database/seeders")]
        path: PathBuf,
    },

    /// Run all seeders in dependency order
    #[command(name = "db:seed")]
    DbSeed,

    /// Run one seeder and its dependencies
    #[command(name = "run:seed")]
    RunSeed {
        /// Seeder name, e.g. users_seeder
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Scaffolding does not touch the database
    match &cli.command {
        Commands::MakeMigration { name, path } => return commands::make::migration(name, path),
        Commands::MakeSeeder { name, path } => return commands::make::seeder(name, path),
        _ => {}
    }

    dotenv::dotenv().ok();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    let mut logging = LoggingConfig::for_environment(&config.environment);
    if std::env::var("LOG_LEVEL").is_ok() {
        logging = logging.with_level(config.log_level.clone());
    }
    init_logging(logging)?;

    tracing::debug!("Running in {} environment", config.environment);

    match cli.command {
        Commands::Migrate => commands::migrate::run(&config).await,
        Commands::MigrateFresh { force } => commands::migrate::fresh(&config, force).await,
        Commands::MigrateRollback => commands::migrate::rollback(&config).await,
        Commands::MigrateStatus { json } => commands::migrate::status(&config, json).await,
        Commands::DbSeed => commands::db::seed_all(&config).await,
        Commands::RunSeed { name } => commands::db::seed_one(&config, &name).await,
        Commands::MakeMigration { .. } | Commands::MakeSeeder { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_colon_commands_parse() {
        let cli = Cli::try_parse_from(["semita", "migrate:fresh", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::MigrateFresh { force: true }));

        let cli = Cli::try_parse_from(["semita", "run:seed", "users_seeder"]).unwrap();
        assert!(matches!(cli.command, Commands::RunSeed { ref name } if name == "users_seeder"));

        let cli = Cli::try_parse_from(["semita", "make:migration", "create_posts_table"]).unwrap();
        match cli.command {
            Commands::MakeMigration { name, path } => {
                assert_eq!(name, "create_posts_table");
                assert_eq!(path, PathBuf::from("database/migrations"));
            }
            _ => panic!("expected make:migration"),
        }

        assert!(Cli::try_parse_from(["semita", "run:seed"]).is_err());
    }
}
