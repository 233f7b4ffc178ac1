//! Migrator behaviour against an in-memory SQLite database

use semita_orm::backends::{DatabaseConnection, SqliteConnection};
use semita_orm::{MigrationPhase, MigrationStatus, Migrator, OrmError, SqlMigration};

async fn migrator() -> Migrator {
    let conn = SqliteConnection::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    Migrator::new(Box::new(conn))
}

fn create_table(timestamp: &str, table: &str) -> SqlMigration {
    SqlMigration::new(timestamp, format!("create_{}_table", table))
        .with_up(format!("CREATE TABLE {} (id INTEGER PRIMARY KEY, name TEXT)", table))
        .with_down(format!("DROP TABLE {}", table))
}

async fn table_exists(conn: &mut dyn DatabaseConnection, table: &str) -> bool {
    conn.fetch_optional(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
        &[table.into()],
    )
    .await
    .unwrap()
    .is_some()
}

async fn count(conn: &mut dyn DatabaseConnection, sql: &str) -> i64 {
    let row = conn.fetch_optional(sql, &[]).await.unwrap().unwrap();
    row.get_by_index(0).unwrap().as_i64().unwrap()
}

#[tokio::test]
async fn migrate_twice_applies_nothing_the_second_time() {
    let mut migrator = migrator().await;
    migrator
        .register(create_table("2024_01_01_000001", "users"))
        .register(create_table("2024_01_01_000002", "roles"));

    let first = migrator.migrate().await.unwrap();
    assert_eq!(first.applied.len(), 2);
    assert_eq!(first.batch, Some(1));

    let second = migrator.migrate().await.unwrap();
    assert!(second.applied.is_empty());
    assert_eq!(second.skipped, 2);
    assert_eq!(second.batch, None);

    assert_eq!(count(migrator.connection(), "SELECT COUNT(*) FROM migrations").await, 2);
}

#[tokio::test]
async fn migrations_run_in_timestamp_order() {
    let mut migrator = migrator().await;
    migrator
        .register(create_table("2024_03_01_000000", "third"))
        .register(create_table("2024_01_01_000000", "first"))
        .register(create_table("2024_02_01_000000", "second"));

    let result = migrator.migrate().await.unwrap();
    assert_eq!(
        result.applied,
        vec![
            "2024_01_01_000000_create_first_table",
            "2024_02_01_000000_create_second_table",
            "2024_03_01_000000_create_third_table",
        ]
    );
}

#[tokio::test]
async fn rollback_reverts_only_the_latest_batch() {
    let mut migrator = migrator().await;
    migrator.register(create_table("2024_01_01_000000", "users"));
    migrator.migrate().await.unwrap();

    migrator.register(create_table("2024_01_02_000000", "posts"));
    let second = migrator.migrate().await.unwrap();
    assert_eq!(second.batch, Some(2));

    let rolled = migrator.rollback().await.unwrap();
    assert_eq!(rolled.batch, Some(2));
    assert_eq!(rolled.rolled_back, vec!["2024_01_02_000000_create_posts_table"]);

    let conn = migrator.connection();
    assert!(table_exists(conn, "users").await);
    assert!(!table_exists(conn, "posts").await);

    let status = migrator.status().await.unwrap();
    assert_eq!(
        status,
        vec![
            (
                "2024_01_01_000000_create_users_table".to_string(),
                MigrationStatus::Applied { batch: 1 }
            ),
            (
                "2024_01_02_000000_create_posts_table".to_string(),
                MigrationStatus::Pending
            ),
        ]
    );
}

#[tokio::test]
async fn rollback_runs_the_batch_newest_first() {
    let mut migrator = migrator().await;
    migrator
        .register(create_table("2024_01_01_000000", "parents"))
        .register(
            SqlMigration::new("2024_01_02_000000", "create_children_table")
                .with_up(
                    "CREATE TABLE children \
                     (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parents (id))",
                )
                .with_down("DROP TABLE children"),
        );
    migrator.migrate().await.unwrap();

    let rolled = migrator.rollback().await.unwrap();
    assert_eq!(
        rolled.rolled_back,
        vec![
            "2024_01_02_000000_create_children_table",
            "2024_01_01_000000_create_parents_table",
        ]
    );

    let conn = migrator.connection();
    assert!(!table_exists(conn, "parents").await);
    assert!(!table_exists(conn, "children").await);
    assert_eq!(count(conn, "SELECT COUNT(*) FROM migrations").await, 0);
}

#[tokio::test]
async fn rollback_on_empty_ledger_is_a_no_op() {
    let mut migrator = migrator().await;
    let result = migrator.rollback().await.unwrap();
    assert!(result.rolled_back.is_empty());
    assert_eq!(result.batch, None);
}

#[tokio::test]
async fn rollback_of_unregistered_migration_fails_before_reverting() {
    let mut migrator = migrator().await;
    migrator
        .register(create_table("2024_01_01_000000", "users"))
        .register(create_table("2024_01_02_000000", "posts"));
    migrator.migrate().await.unwrap();

    let conn = migrator.into_connection();
    let mut migrator = Migrator::new(conn);
    migrator.register(create_table("2024_01_01_000000", "users"));

    let err = migrator.rollback().await.unwrap_err();
    assert!(matches!(
        err,
        OrmError::MigrationNotFound(ref id) if id == "2024_01_02_000000_create_posts_table"
    ));

    let conn = migrator.connection();
    assert!(table_exists(conn, "users").await);
    assert!(table_exists(conn, "posts").await);
    assert_eq!(count(conn, "SELECT COUNT(*) FROM migrations").await, 2);
}

#[tokio::test]
async fn fresh_rebuilds_every_table() {
    let mut migrator = migrator().await;
    migrator
        .register(create_table("2024_01_01_000000", "users"))
        .register(
            SqlMigration::new("2024_01_02_000000", "create_tokens_table")
                .with_up(
                    "CREATE TABLE tokens \
                     (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users (id))",
                )
                .with_down("DROP TABLE tokens"),
        );
    migrator.migrate().await.unwrap();

    let conn = migrator.connection();
    conn.execute("INSERT INTO users (id, name) VALUES (1, 'ada')", &[]).await.unwrap();
    conn.execute("INSERT INTO tokens (id, user_id) VALUES (1, 1)", &[]).await.unwrap();
    conn.execute("CREATE TABLE stray (id INTEGER)", &[]).await.unwrap();

    let result = migrator.fresh().await.unwrap();
    assert_eq!(result.applied.len(), 2);
    assert_eq!(result.batch, Some(1));

    let conn = migrator.connection();
    assert_eq!(count(conn, "SELECT COUNT(*) FROM users").await, 0);
    assert_eq!(count(conn, "SELECT COUNT(*) FROM tokens").await, 0);
    assert!(!table_exists(conn, "stray").await);

    let again = migrator.migrate().await.unwrap();
    assert!(again.applied.is_empty());
}

#[tokio::test]
async fn custom_ledger_table_is_used() {
    let conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
    let mut migrator = Migrator::with_config(
        Box::new(conn),
        semita_orm::MigrationConfig {
            migrations_table: "schema_history".to_string(),
        },
    );
    migrator.register(create_table("2024_01_01_000000", "users"));
    migrator.migrate().await.unwrap();

    assert_eq!(migrator.ledger_table(), "schema_history");
    assert_eq!(
        count(migrator.connection(), "SELECT COUNT(*) FROM schema_history").await,
        1
    );
}

#[tokio::test]
async fn ledger_survives_reconnecting() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("semita.db").display());

    let conn = semita_orm::connect(&url).await.unwrap();
    let mut migrator = Migrator::new(conn);
    migrator.register(create_table("2024_01_01_000000", "users"));
    migrator.migrate().await.unwrap();
    migrator.close().await.unwrap();

    let conn = semita_orm::connect(&url).await.unwrap();
    let mut migrator = Migrator::new(conn);
    migrator
        .register(create_table("2024_01_01_000000", "users"))
        .register(create_table("2024_01_02_000000", "posts"));

    let result = migrator.migrate().await.unwrap();
    assert_eq!(result.applied, vec!["2024_01_02_000000_create_posts_table"]);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.batch, Some(2));
}

#[tokio::test]
async fn failed_step_keeps_earlier_steps_of_the_run() {
    let mut migrator = migrator().await;
    migrator
        .register(create_table("2024_01_01_000001", "a"))
        .register(SqlMigration::new("2024_01_01_000002", "b").with_up("CREATE TABLE"))
        .register(create_table("2024_01_01_000003", "c"));

    let err = migrator.migrate().await.unwrap_err();
    match err {
        OrmError::Migration { id, phase, .. } => {
            assert_eq!(id, "2024_01_01_000002_b");
            assert_eq!(phase, MigrationPhase::Up);
        }
        other => panic!("unexpected error: {}", other),
    }

    let conn = migrator.connection();
    assert_eq!(count(&mut *conn, "SELECT COUNT(*) FROM migrations").await, 1);
    assert!(table_exists(&mut *conn, "a").await);
    assert!(!table_exists(&mut *conn, "c").await);

    let status = migrator.status().await.unwrap();
    assert_eq!(status[0].1, MigrationStatus::Applied { batch: 1 });
    assert_eq!(status[1].1, MigrationStatus::Pending);
    assert_eq!(status[2].1, MigrationStatus::Pending);
}
