//! make:migration and make:seeder

use std::path::Path;

use anyhow::Result;
use chrono::Local;

use crate::generators::{self, TemplateEngine};

pub fn migration(name: &str, dir: &Path) -> Result<()> {
    let engine = TemplateEngine::new()?;
    let file = generators::migration_file(&engine, dir, name, Local::now())?;
    file.write()?;

    println!("Created migration: {}", file.path.display());
    println!("Register it in database/migrations/mod.rs to include it in `semita migrate`");
    Ok(())
}

pub fn seeder(name: &str, dir: &Path) -> Result<()> {
    let engine = TemplateEngine::new()?;
    let file = generators::seeder_file(&engine, dir, name)?;
    file.write()?;

    println!("Created seeder: {}", file.path.display());
    println!("Register it in database/seeders/mod.rs to include it in `semita db:seed`");
    Ok(())
}
