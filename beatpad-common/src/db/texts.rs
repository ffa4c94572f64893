//! Text note queries

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::db::users::ensure_user_exists;
use crate::error::{NotFoundError, Result};
use crate::fields::validate_new_text;
use crate::models::{NewText, Text};

fn text_from_row(row: &SqliteRow) -> Text {
    Text {
        id: row.get("id"),
        content: row.get("content"),
        user_id: row.get("user_id"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

pub async fn create_text(pool: &SqlitePool, new_text: &NewText) -> Result<Text> {
    validate_new_text(new_text)?;
    ensure_user_exists(pool, new_text.user_id).await?;

    let created_at = Utc::now();
    let result = sqlx::query("INSERT INTO texts (content, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&new_text.content)
        .bind(new_text.user_id)
        .bind(created_at)
        .execute(pool)
        .await?;

    let id = result.last_insert_rowid();
    info!("Created text {} for user {}", id, new_text.user_id);

    Ok(Text {
        id,
        content: new_text.content.clone(),
        user_id: new_text.user_id,
        created_at,
    })
}

pub async fn list_texts(pool: &SqlitePool) -> Result<Vec<Text>> {
    let rows = sqlx::query("SELECT id, content, user_id, created_at FROM texts ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(text_from_row).collect())
}

pub async fn get_text(pool: &SqlitePool, text_id: i64) -> Result<Text> {
    let row = sqlx::query("SELECT id, content, user_id, created_at FROM texts WHERE id = ?")
        .bind(text_id)
        .fetch_optional(pool)
        .await?
        .ok_or(NotFoundError::Text(text_id))?;
    Ok(text_from_row(&row))
}

/// Delete a text. Blocks that reference it are left in place.
pub async fn delete_text(pool: &SqlitePool, text_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM texts WHERE id = ?")
        .bind(text_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(NotFoundError::Text(text_id).into());
    }
    info!("Deleted text {}", text_id);
    Ok(())
}
