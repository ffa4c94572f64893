//! Domain records and request payloads

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::beat_schema::BeatPattern;
use crate::error::ValidationError;

/// Self-reported skill level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl UserLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            UserLevel::Beginner => "beginner",
            UserLevel::Intermediate => "intermediate",
            UserLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for UserLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(UserLevel::Beginner),
            "intermediate" => Ok(UserLevel::Intermediate),
            "advanced" => Ok(UserLevel::Advanced),
            other => Err(ValidationError::field(
                "level",
                format!("'{other}' is not one of: beginner, intermediate, advanced"),
            )),
        }
    }
}

/// Registered account (password material is never exposed)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub level: UserLevel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Beat {
    pub id: i64,
    pub beat_name: String,
    pub genre: String,
    pub bpm: i64,
    pub beat_schema: BeatPattern,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Page metadata without its blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Kind of record a page block points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Beat,
    Text,
}

impl BlockType {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Beat => "beat",
            BlockType::Text => "text",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beat" => Ok(BlockType::Beat),
            "text" => Ok(BlockType::Text),
            other => Err(ValidationError::InvalidBlockType(other.to_string())),
        }
    }
}

/// Typed reference from a block to the record it displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRef {
    Beat(i64),
    Text(i64),
}

impl BlockRef {
    pub fn new(block_type: BlockType, id: i64) -> Self {
        match block_type {
            BlockType::Beat => BlockRef::Beat(id),
            BlockType::Text => BlockRef::Text(id),
        }
    }

    /// Parse a raw `block_type` tag plus id
    pub fn parse(block_type: &str, id: i64) -> Result<Self, ValidationError> {
        Ok(Self::new(block_type.parse()?, id))
    }

    pub fn block_type(self) -> BlockType {
        match self {
            BlockRef::Beat(_) => BlockType::Beat,
            BlockRef::Text(_) => BlockType::Text,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            BlockRef::Beat(id) | BlockRef::Text(id) => id,
        }
    }
}

/// One positioned block as exposed to callers
///
/// Carries the referenced record's id only; resolving the body is up to
/// the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageBlockView {
    pub id: i64,
    pub block_type: BlockType,
    pub block_id: i64,
    pub position: i64,
}

impl PageBlockView {
    pub fn block_ref(&self) -> BlockRef {
        BlockRef::new(self.block_type, self.block_id)
    }
}

/// Stored block including its parent page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageBlock {
    pub id: i64,
    pub page_id: i64,
    pub block_type: BlockType,
    pub block_id: i64,
    pub position: i64,
}

/// Page metadata plus its ordered blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
    pub blocks: Vec<PageBlockView>,
}

// ========================================
// Request payloads
// ========================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub level: String,
    pub password: String,
}

/// Create or full-update payload for a beat
///
/// `beat_schema` stays untyped until it passes the validator so that
/// structural problems map to specific [`ValidationError`] variants.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBeat {
    pub beat_name: String,
    pub genre: String,
    pub bpm: i64,
    pub beat_schema: serde_json::Value,
    pub user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeatUpdate {
    pub beat_name: String,
    pub genre: String,
    pub bpm: i64,
    pub beat_schema: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewText {
    pub content: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPage {
    pub title: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPageBlock {
    pub block_type: String,
    pub block_id: i64,
    pub position: i64,
    pub page_id: i64,
}
