//! HTTP API handlers for beatpad-api

pub mod beats;
pub mod health;
pub mod pages;
pub mod texts;
pub mod users;

pub use beats::{create_beat, delete_beat, get_beat, list_beats, update_beat, validate_beat_schema};
pub use health::health_routes;
pub use pages::{
    add_page_block, create_page, delete_page, list_all_blocks, list_page_blocks, list_pages,
    render_page,
};
pub use texts::{create_text, delete_text, get_text, list_texts};
pub use users::{delete_user, get_user, list_users, register};
