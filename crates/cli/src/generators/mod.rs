//! File scaffolding for new migrations and seeders

pub mod templates;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use semita_core::{CoreError, CoreResult};
use tera::{Context, Tera};

/// Tera instance preloaded with the scaffolding templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new() -> CoreResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("migration", templates::MIGRATION_TEMPLATE)
            .map_err(|e| {
                CoreError::template(format!("Failed to register migration template: {}", e))
            })?;
        tera.add_raw_template("seeder", templates::SEEDER_TEMPLATE)
            .map_err(|e| {
                CoreError::template(format!("Failed to register seeder template: {}", e))
            })?;
        // Generated Rust source, not HTML
        tera.autoescape_on(vec![]);

        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> CoreResult<String> {
        self.tera
            .render(template, context)
            .map_err(|e| CoreError::template(format!("Template rendering error: {}", e)))
    }
}

/// A scaffolded file ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    /// Write the file, creating parent directories. Existing files are left alone.
    pub fn write(&self) -> CoreResult<()> {
        if self.path.exists() {
            return Err(CoreError::template(format!(
                "{} already exists",
                self.path.display()
            )));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, &self.content)?;
        Ok(())
    }
}

/// Lower-case the name and replace spaces and dashes with underscores
pub fn snake_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// `create_users_table` -> `CreateUsersTable`
pub fn pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Table a migration name refers to: `create_user_roles_table` -> `user_roles`,
/// `add_avatar_to_users_table` -> `users`. Names without a `_table` suffix are
/// used as they are.
pub fn table_name(snake: &str) -> String {
    let Some(stem) = snake.strip_suffix("_table") else {
        return snake.to_string();
    };

    if let Some(table) = stem.strip_prefix("create_") {
        return table.to_string();
    }
    match stem.rfind("_to_").or_else(|| stem.rfind("_from_")) {
        Some(index) => stem[index..]
            .trim_start_matches("_to_")
            .trim_start_matches("_from_")
            .to_string(),
        None => stem.to_string(),
    }
}

/// Build a migration stub named `m<timestamp>_<name>.rs` inside `dir`
pub fn migration_file(
    engine: &TemplateEngine,
    dir: &Path,
    name: &str,
    now: DateTime<Local>,
) -> CoreResult<GeneratedFile> {
    let migration_name = snake_name(name);
    if migration_name.is_empty() {
        return Err(CoreError::template("migration name must not be empty"));
    }
    let timestamp = now.format("%Y_%m_%d_%H%M%S").to_string();

    let mut context = Context::new();
    context.insert("struct_name", &pascal_case(&migration_name));
    context.insert("migration_name", &migration_name);
    context.insert("timestamp", &timestamp);
    context.insert("table_name", &table_name(&migration_name));

    Ok(GeneratedFile {
        path: dir.join(format!("m{}_{}.rs", timestamp, migration_name)),
        content: engine.render("migration", &context)?,
    })
}

/// Build a seeder stub named `<name>_seeder.rs` inside `dir`
pub fn seeder_file(engine: &TemplateEngine, dir: &Path, name: &str) -> CoreResult<GeneratedFile> {
    let base = snake_name(name);
    let base = base.strip_suffix("_seeder").unwrap_or(&base).to_string();
    if base.is_empty() {
        return Err(CoreError::template("seeder name must not be empty"));
    }
    let seeder_name = format!("{}_seeder", base);

    let mut context = Context::new();
    context.insert("struct_name", &pascal_case(&seeder_name));
    context.insert("seeder_name", &seeder_name);
    context.insert("table_name", &base);

    Ok(GeneratedFile {
        path: dir.join(format!("{}.rs", seeder_name)),
        content: engine.render("seeder", &context)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 11, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_naming_helpers() {
        assert_eq!(snake_name("Create Posts-Table"), "create_posts_table");
        assert_eq!(pascal_case("create_oauth_tokens_table"), "CreateOauthTokensTable");
        assert_eq!(table_name("create_user_roles_table"), "user_roles");
        assert_eq!(table_name("add_avatar_to_users_table"), "users");
        assert_eq!(table_name("posts_table"), "posts");
        assert_eq!(table_name("backfill_slugs"), "backfill_slugs");
    }

    #[test]
    fn test_migration_stub() {
        let engine = TemplateEngine::new().unwrap();
        let file = migration_file(
            &engine,
            Path::new("migrations"),
            "create_posts_table",
            fixed_now(),
        )
        .unwrap();

        assert_eq!(
            file.path,
            Path::new("migrations").join("m2025_07_11_093005_create_posts_table.rs")
        );
        assert!(file.content.contains("pub struct CreatePostsTable;"));
        assert!(file.content.contains("\"2025_07_11_093005\""));
        assert!(file.content.contains("Schema::create(\"posts\""));
        assert!(file.content.contains("Schema::drop_if_exists(\"posts\")"));
    }

    #[test]
    fn test_seeder_stub() {
        let engine = TemplateEngine::new().unwrap();
        let file = seeder_file(&engine, Path::new("seeders"), "categories").unwrap();

        assert_eq!(file.path, Path::new("seeders").join("categories_seeder.rs"));
        assert!(file.content.contains("pub struct CategoriesSeeder;"));
        assert!(file.content.contains("\"categories_seeder\""));
        assert!(file.content.contains("vec![\"categories\".to_string()]"));

        let same = seeder_file(&engine, Path::new("seeders"), "categories_seeder").unwrap();
        assert_eq!(same.path, file.path);
    }

    #[test]
    fn test_empty_names_are_rejected() {
        let engine = TemplateEngine::new().unwrap();
        assert!(migration_file(&engine, Path::new("m"), "  ", fixed_now()).is_err());
        assert!(seeder_file(&engine, Path::new("s"), "_seeder").is_err());
    }

    #[test]
    fn test_existing_files_are_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let engine = TemplateEngine::new().unwrap();
        let file = seeder_file(&engine, &dir.path().join("seeders"), "tags").unwrap();

        file.write().unwrap();
        assert!(file.path.exists());

        std::fs::write(&file.path, "// edited").unwrap();
        assert!(file.write().is_err());
        assert_eq!(std::fs::read_to_string(&file.path).unwrap(), "// edited");
    }
}
