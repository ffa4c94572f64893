//! Page composition
//!
//! A page owns an ordered list of blocks, each pointing at a beat or a text.
//! [`PageComposer`] validates block writes against a [`RecordStore`] and
//! produces blocks in render order: `position` ascending, block id ascending
//! on ties. Positions are not required to be unique or contiguous.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{NotFoundError, ValidationError};
use crate::models::{BlockRef, Page, PageBlockView, PageView};
use crate::Result;

/// Persistence operations the composition model relies on
///
/// Implementations provide their own transaction isolation; the composer
/// holds no locks and performs no retries.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Page metadata, `None` when no such page exists
    async fn page(&self, page_id: i64) -> Result<Option<Page>>;

    /// Whether a record of the referenced type exists
    async fn record_exists(&self, block_ref: BlockRef) -> Result<bool>;

    /// Insert a block under `page_id`.
    ///
    /// Page existence is re-checked atomically with the insert; returns
    /// `None` without writing if the page is gone.
    async fn insert_block(
        &self,
        page_id: i64,
        block_ref: BlockRef,
        position: i64,
    ) -> Result<Option<i64>>;

    /// All blocks of a page, in any order
    async fn page_blocks(&self, page_id: i64) -> Result<Vec<PageBlockView>>;

    /// Delete a page together with its blocks as one unit.
    ///
    /// Returns the number of blocks removed, or `None` if the page did not
    /// exist.
    async fn delete_page(&self, page_id: i64) -> Result<Option<u64>>;
}

/// Render order for blocks
pub fn sort_blocks(blocks: &mut [PageBlockView]) {
    blocks.sort_by_key(|block| (block.position, block.id));
}

/// Validates and maintains the blocks of pages
#[derive(Debug, Clone)]
pub struct PageComposer<S> {
    store: S,
}

impl<S: RecordStore> PageComposer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Attach a new block to a page and return its id.
    ///
    /// Rejects unknown type tags before touching the store, then requires
    /// the page and the referenced record to exist. Nothing is written on
    /// failure.
    pub async fn add_block(
        &self,
        page_id: i64,
        block_type: &str,
        block_id: i64,
        position: i64,
    ) -> Result<i64> {
        let block_ref = BlockRef::parse(block_type, block_id).inspect_err(|e| {
            warn!("Rejected block for page {}: {}", page_id, e);
        })?;

        if self.store.page(page_id).await?.is_none() {
            return Err(NotFoundError::Page(page_id).into());
        }

        if !self.store.record_exists(block_ref).await? {
            warn!(
                "Rejected block for page {}: {} {} does not exist",
                page_id,
                block_ref.block_type(),
                block_ref.id()
            );
            return Err(ValidationError::DanglingReference(block_ref).into());
        }

        let id = self
            .store
            .insert_block(page_id, block_ref, position)
            .await?
            .ok_or(NotFoundError::Page(page_id))?;

        info!(
            "Added block {} to page {} ({} {} at position {})",
            id,
            page_id,
            block_ref.block_type(),
            block_ref.id(),
            position
        );
        Ok(id)
    }

    /// Blocks of a page in render order
    pub async fn list_blocks(&self, page_id: i64) -> Result<Vec<PageBlockView>> {
        if self.store.page(page_id).await?.is_none() {
            return Err(NotFoundError::Page(page_id).into());
        }
        let mut blocks = self.store.page_blocks(page_id).await?;
        sort_blocks(&mut blocks);
        debug!("Page {} has {} blocks", page_id, blocks.len());
        Ok(blocks)
    }

    /// Page metadata plus ordered block references.
    ///
    /// Referenced beat and text bodies are not resolved.
    pub async fn render_page(&self, page_id: i64) -> Result<PageView> {
        let page = self
            .store
            .page(page_id)
            .await?
            .ok_or(NotFoundError::Page(page_id))?;
        let mut blocks = self.store.page_blocks(page_id).await?;
        sort_blocks(&mut blocks);

        Ok(PageView {
            id: page.id,
            title: page.title,
            user_id: page.user_id,
            blocks,
        })
    }

    /// Delete a page and all of its blocks; returns the number of blocks
    /// removed.
    pub async fn delete_page(&self, page_id: i64) -> Result<u64> {
        let removed = self
            .store
            .delete_page(page_id)
            .await?
            .ok_or(NotFoundError::Page(page_id))?;
        info!("Deleted page {} and {} blocks", page_id, removed);
        Ok(removed)
    }
}
