//! Common error types for Beatpad
//!
//! Validation, not-found and conflict conditions are recoverable and carry
//! enough structure for the HTTP layer to build a caller-readable rejection.
//! Store failures are wrapped as [`Error::Database`] and treated as fatal.

use thiserror::Error;

use crate::beat_schema::REQUIRED_INSTRUMENTS;
use crate::models::BlockRef;

/// Common result type for Beatpad operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type across Beatpad crates
#[derive(Error, Debug)]
pub enum Error {
    /// Submitted document failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Requested record does not exist
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Uniqueness constraint violated
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (e.g. stored data no longer decodes)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Structural rejection of a submitted document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more of the required instruments is absent.
    ///
    /// The message always lists the full required set, not just the
    /// missing entries.
    #[error("beat schema must contain following instruments: {}", REQUIRED_INSTRUMENTS.join(", "))]
    MissingInstrument,

    /// Instrument value is not a list, or one of its bars is not a list
    #[error("{instrument} must be a list of lists")]
    MalformedBar { instrument: String },

    /// A bar contains a non-integer step
    #[error("{instrument} must be a list of lists of integers")]
    MalformedStep { instrument: String },

    /// Block type tag is not one of `beat` or `text`
    #[error("invalid block type '{0}', expected one of: beat, text")]
    InvalidBlockType(String),

    /// Block references a record that does not exist
    #[error("block references missing {} {}", .0.block_type(), .0.id())]
    DanglingReference(BlockRef),

    /// Plain field rule (length, range, enumeration) violated
    #[error("{field}: {message}")]
    InvalidField { field: &'static str, message: String },
}

impl ValidationError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingInstrument => "MISSING_INSTRUMENT",
            ValidationError::MalformedBar { .. } => "MALFORMED_BAR",
            ValidationError::MalformedStep { .. } => "MALFORMED_STEP",
            ValidationError::InvalidBlockType(_) => "INVALID_BLOCK_TYPE",
            ValidationError::DanglingReference(_) => "DANGLING_REFERENCE",
            ValidationError::InvalidField { .. } => "INVALID_FIELD",
        }
    }

    pub(crate) fn field(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

/// Lookup by id found nothing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("Page {0} not found")]
    Page(i64),
    #[error("Beat {0} not found")]
    Beat(i64),
    #[error("Text {0} not found")]
    Text(i64),
    #[error("User {0} not found")]
    User(i64),
}

/// Registration collided with an existing account
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),
}

impl ConflictError {
    pub fn code(&self) -> &'static str {
        match self {
            ConflictError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            ConflictError::DuplicateUsername(_) => "DUPLICATE_USERNAME",
        }
    }
}
