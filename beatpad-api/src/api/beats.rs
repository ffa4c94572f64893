//! Beat endpoints
//!
//! Patterns are rejected with a specific code (`MISSING_INSTRUMENT`,
//! `MALFORMED_BAR`, `MALFORMED_STEP`) before anything is stored.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use beatpad_common::db::beats;
use beatpad_common::models::{Beat, BeatUpdate, NewBeat};
use beatpad_common::BeatPattern;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

/// POST /beats/validate
///
/// Runs only the pattern validator and echoes the accepted pattern.
pub async fn validate_beat_schema(
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<BeatPattern>> {
    let Json(document) = payload?;
    Ok(Json(beatpad_common::validate_beat_schema(&document)?))
}

/// POST /beats
pub async fn create_beat(
    State(state): State<AppState>,
    payload: Result<Json<NewBeat>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Beat>)> {
    let Json(new_beat) = payload?;
    let beat = beats::create_beat(&state.db, &new_beat).await?;
    Ok((StatusCode::CREATED, Json(beat)))
}

/// GET /beats
pub async fn list_beats(State(state): State<AppState>) -> ApiResult<Json<Vec<Beat>>> {
    Ok(Json(beats::list_beats(&state.db).await?))
}

/// GET /beats/:id
pub async fn get_beat(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Beat>> {
    let Path(beat_id) = path?;
    Ok(Json(beats::get_beat(&state.db, beat_id).await?))
}

/// PUT /beats/:id
pub async fn update_beat(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BeatUpdate>, JsonRejection>,
) -> ApiResult<Json<Beat>> {
    let Path(beat_id) = path?;
    let Json(update) = payload?;
    Ok(Json(beats::update_beat(&state.db, beat_id, &update).await?))
}

/// DELETE /beats/:id
pub async fn delete_beat(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(beat_id) = path?;
    beats::delete_beat(&state.db, beat_id).await?;
    Ok(Json(json!({ "message": format!("Beat {beat_id} deleted") })))
}
