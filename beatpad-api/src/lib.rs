//! beatpad-api library - HTTP service for beats, texts and pages
//!
//! Handlers are thin: payload validation, pattern checks and page
//! composition live in `beatpad-common`.

use axum::Router;
use beatpad_common::db::SqliteStore;
use beatpad_common::PageComposer;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Page composition over the same pool
    pub pages: PageComposer<SqliteStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        let pages = PageComposer::new(SqliteStore::new(db.clone()));
        Self { db, pages }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/register", post(api::register))
        .route("/users", get(api::list_users))
        .route("/users/:id", get(api::get_user).delete(api::delete_user))
        .route("/beats", get(api::list_beats).post(api::create_beat))
        .route("/beats/validate", post(api::validate_beat_schema))
        .route(
            "/beats/:id",
            get(api::get_beat).put(api::update_beat).delete(api::delete_beat),
        )
        .route("/texts", get(api::list_texts).post(api::create_text))
        .route("/texts/:id", get(api::get_text).delete(api::delete_text))
        .route("/pages", get(api::list_pages).post(api::create_page))
        .route("/pages/:id", get(api::render_page).delete(api::delete_page))
        .route("/pages/:id/blocks", get(api::list_page_blocks))
        .route(
            "/page_blocks",
            get(api::list_all_blocks).post(api::add_page_block),
        );

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
