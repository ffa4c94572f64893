//! Database initialization on first run and reopen

use beatpad_common::db::init::init_database;
use std::path::PathBuf;

async fn table_names(pool: &sqlx::SqlitePool) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path: PathBuf = dir.path().join("nested").join("beatpad.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_schema_tables_created() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("beatpad.db")).await.unwrap();

    assert_eq!(
        table_names(&pool).await,
        vec!["beats", "page_blocks", "pages", "texts", "users"]
    );
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("beatpad.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO users (username, email, level, password_hash, password_salt, created_at) \
         VALUES ('a', 'a@b.cd', 'beginner', '', '', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool1)
    .await
    .unwrap();
    pool1.close().await;

    // Second open keeps existing rows
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("beatpad.db")).await.unwrap();

    let orphan = sqlx::query(
        "INSERT INTO pages (title, user_id, created_at) VALUES ('t', 999, '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;

    assert!(orphan.is_err(), "page without owner should violate foreign key");
}

#[tokio::test]
async fn test_block_type_check_constraint() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("beatpad.db")).await.unwrap();

    sqlx::query(
        "INSERT INTO users (id, username, email, level, password_hash, password_salt, created_at) \
         VALUES (1, 'a', 'a@b.cd', 'beginner', '', '', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO pages (id, title, user_id, created_at) VALUES (1, 't', 1, '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let video = sqlx::query(
        "INSERT INTO page_blocks (page_id, block_type, block_id, position) VALUES (1, 'video', 1, 0)",
    )
    .execute(&pool)
    .await;

    assert!(video.is_err());
}
