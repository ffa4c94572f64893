//! Text note endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use beatpad_common::db::texts;
use beatpad_common::models::{NewText, Text};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

/// POST /texts
pub async fn create_text(
    State(state): State<AppState>,
    payload: Result<Json<NewText>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Text>)> {
    let Json(new_text) = payload?;
    let text = texts::create_text(&state.db, &new_text).await?;
    Ok((StatusCode::CREATED, Json(text)))
}

/// GET /texts
pub async fn list_texts(State(state): State<AppState>) -> ApiResult<Json<Vec<Text>>> {
    Ok(Json(texts::list_texts(&state.db).await?))
}

/// GET /texts/:id
pub async fn get_text(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Text>> {
    let Path(text_id) = path?;
    Ok(Json(texts::get_text(&state.db, text_id).await?))
}

/// DELETE /texts/:id
pub async fn delete_text(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(text_id) = path?;
    texts::delete_text(&state.db, text_id).await?;
    Ok(Json(json!({ "message": format!("Text {text_id} deleted") })))
}
