//! SQLite schema and record queries

pub mod beats;
pub mod init;
pub mod pages;
pub mod texts;
pub mod users;

pub use init::{create_schema, init_database, init_memory_database};
pub use pages::SqliteStore;
