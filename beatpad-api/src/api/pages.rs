//! Page and page block endpoints
//!
//! Block writes, block listing, rendering and deletion go through the
//! page composer; page creation and the flat block listing are plain
//! queries.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use beatpad_common::db::pages;
use beatpad_common::models::{NewPage, NewPageBlock, Page, PageBlock, PageBlockView, PageView};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

/// Response for a newly attached block
#[derive(Debug, Serialize)]
pub struct AddBlockResponse {
    pub id: i64,
    pub page_id: i64,
}

/// POST /pages
pub async fn create_page(
    State(state): State<AppState>,
    payload: Result<Json<NewPage>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Page>)> {
    let Json(new_page) = payload?;
    let page = pages::create_page(&state.db, &new_page).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// GET /pages
pub async fn list_pages(State(state): State<AppState>) -> ApiResult<Json<Vec<Page>>> {
    Ok(Json(pages::list_pages(&state.db).await?))
}

/// GET /pages/:id
///
/// Page metadata with its blocks in render order. Blocks carry the
/// referenced record's id, not its body.
pub async fn render_page(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<PageView>> {
    let Path(page_id) = path?;
    Ok(Json(state.pages.render_page(page_id).await?))
}

/// GET /pages/:id/blocks
pub async fn list_page_blocks(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<PageBlockView>>> {
    let Path(page_id) = path?;
    Ok(Json(state.pages.list_blocks(page_id).await?))
}

/// DELETE /pages/:id
pub async fn delete_page(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(page_id) = path?;
    let removed = state.pages.delete_page(page_id).await?;
    Ok(Json(json!({
        "message": format!("Page {page_id} deleted"),
        "blocks_removed": removed,
    })))
}

/// POST /page_blocks
pub async fn add_page_block(
    State(state): State<AppState>,
    payload: Result<Json<NewPageBlock>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AddBlockResponse>)> {
    let Json(block) = payload?;
    let id = state
        .pages
        .add_block(block.page_id, &block.block_type, block.block_id, block.position)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AddBlockResponse {
            id,
            page_id: block.page_id,
        }),
    ))
}

/// GET /page_blocks
pub async fn list_all_blocks(State(state): State<AppState>) -> ApiResult<Json<Vec<PageBlock>>> {
    Ok(Json(pages::list_all_blocks(&state.db).await?))
}
