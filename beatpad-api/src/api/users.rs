//! Registration and user listing

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use beatpad_common::db::users;
use beatpad_common::models::{NewUser, User};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(new_user) = payload?;
    let user = users::create_user(&state.db, &new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(users::list_users(&state.db).await?))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(user_id) = path?;
    Ok(Json(users::get_user(&state.db, user_id).await?))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(user_id) = path?;
    users::delete_user(&state.db, user_id).await?;
    Ok(Json(json!({ "message": format!("User {user_id} deleted") })))
}
