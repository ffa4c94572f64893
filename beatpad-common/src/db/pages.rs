//! Page and page block queries
//!
//! Block writes and page deletion go through [`SqliteStore`], the
//! [`RecordStore`] backing the page composer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::composition::RecordStore;
use crate::db::users::ensure_user_exists;
use crate::error::{Error, Result};
use crate::fields::validate_new_page;
use crate::models::{BlockRef, BlockType, NewPage, Page, PageBlock, PageBlockView};

fn page_from_row(row: &SqliteRow) -> Page {
    Page {
        id: row.get("id"),
        title: row.get("title"),
        user_id: row.get("user_id"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn block_type_from_row(row: &SqliteRow) -> Result<BlockType> {
    let tag: String = row.get("block_type");
    tag.parse()
        .map_err(|_| Error::Internal(format!("stored block type '{tag}' is invalid")))
}

pub async fn create_page(pool: &SqlitePool, new_page: &NewPage) -> Result<Page> {
    validate_new_page(new_page)?;
    ensure_user_exists(pool, new_page.user_id).await?;

    let created_at = Utc::now();
    let result = sqlx::query("INSERT INTO pages (title, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&new_page.title)
        .bind(new_page.user_id)
        .bind(created_at)
        .execute(pool)
        .await?;

    let id = result.last_insert_rowid();
    info!("Created page {} '{}' for user {}", id, new_page.title, new_page.user_id);

    Ok(Page {
        id,
        title: new_page.title.clone(),
        user_id: new_page.user_id,
        created_at,
    })
}

pub async fn list_pages(pool: &SqlitePool) -> Result<Vec<Page>> {
    let rows = sqlx::query("SELECT id, title, user_id, created_at FROM pages ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(page_from_row).collect())
}

/// Every block of every page, ordered by page then render order
pub async fn list_all_blocks(pool: &SqlitePool) -> Result<Vec<PageBlock>> {
    let rows = sqlx::query(
        "SELECT id, page_id, block_type, block_id, position FROM page_blocks \
         ORDER BY page_id, position, id",
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(PageBlock {
                id: row.get("id"),
                page_id: row.get("page_id"),
                block_type: block_type_from_row(row)?,
                block_id: row.get("block_id"),
                position: row.get("position"),
            })
        })
        .collect()
}

/// SQLite-backed record store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn page(&self, page_id: i64) -> Result<Option<Page>> {
        let row = sqlx::query("SELECT id, title, user_id, created_at FROM pages WHERE id = ?")
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(page_from_row))
    }

    async fn record_exists(&self, block_ref: BlockRef) -> Result<bool> {
        let sql = match block_ref {
            BlockRef::Beat(_) => "SELECT EXISTS(SELECT 1 FROM beats WHERE id = ?)",
            BlockRef::Text(_) => "SELECT EXISTS(SELECT 1 FROM texts WHERE id = ?)",
        };
        let exists: bool = sqlx::query_scalar(sql)
            .bind(block_ref.id())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_block(
        &self,
        page_id: i64,
        block_ref: BlockRef,
        position: i64,
    ) -> Result<Option<i64>> {
        // Page check and insert in one statement, under one write lock
        let result = sqlx::query(
            "INSERT INTO page_blocks (page_id, block_type, block_id, position) \
             SELECT ?, ?, ?, ? WHERE EXISTS (SELECT 1 FROM pages WHERE id = ?)",
        )
        .bind(page_id)
        .bind(block_ref.block_type().as_str())
        .bind(block_ref.id())
        .bind(position)
        .bind(page_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(result.last_insert_rowid()))
    }

    async fn page_blocks(&self, page_id: i64) -> Result<Vec<PageBlockView>> {
        let rows = sqlx::query(
            "SELECT id, block_type, block_id, position FROM page_blocks \
             WHERE page_id = ? ORDER BY position, id",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PageBlockView {
                    id: row.get("id"),
                    block_type: block_type_from_row(row)?,
                    block_id: row.get("block_id"),
                    position: row.get("position"),
                })
            })
            .collect()
    }

    async fn delete_page(&self, page_id: i64) -> Result<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        // Blocks are removed explicitly so the count is exact; the FK
        // cascade would drop them silently.
        let blocks = sqlx::query("DELETE FROM page_blocks WHERE page_id = ?")
            .bind(page_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let pages = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(page_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if pages == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(blocks))
    }
}
