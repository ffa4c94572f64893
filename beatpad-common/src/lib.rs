//! # Beatpad Common Library
//!
//! Shared code for the Beatpad drum-beat backend:
//! - Beat pattern validation
//! - Page composition over a record store
//! - Domain models and request payloads
//! - SQLite schema and queries
//! - Configuration loading and password hashing

pub mod beat_schema;
pub mod composition;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod models;
pub mod password;

pub use beat_schema::{validate_beat_schema, BeatPattern, REQUIRED_INSTRUMENTS};
pub use composition::{PageComposer, RecordStore};
pub use error::{ConflictError, Error, NotFoundError, Result, ValidationError};
