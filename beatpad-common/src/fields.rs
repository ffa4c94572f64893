//! Plain field rules for request payloads
//!
//! Checked before any store access. Each payload validator returns the
//! first failing field.

use crate::beat_schema::{validate_beat_schema, BeatPattern};
use crate::error::ValidationError;
use crate::models::{BeatUpdate, NewBeat, NewPage, NewText, NewUser, UserLevel};

const MAX_USERNAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_BEAT_NAME_LEN: usize = 50;
const MAX_GENRE_LEN: usize = 50;
const MAX_TEXT_LEN: usize = 500;
const MAX_TITLE_LEN: usize = 100;

/// Length in characters must fall within `min..=max`
fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::field(
            field,
            format!("length must be between {min} and {max}"),
        ));
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), ValidationError> {
    check_length("email", value, 1, MAX_EMAIL_LEN)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::field("email", "not a valid email address"))
    }
}

fn check_bpm(bpm: i64) -> Result<(), ValidationError> {
    if bpm <= 0 {
        return Err(ValidationError::field("bpm", "must be a positive integer"));
    }
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> Result<UserLevel, ValidationError> {
    check_length("username", &user.username, 1, MAX_USERNAME_LEN)?;
    check_email(&user.email)?;
    let level = user.level.parse()?;
    if user.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::field(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(level)
}

fn validate_beat_fields(
    beat_name: &str,
    genre: &str,
    bpm: i64,
    beat_schema: &serde_json::Value,
) -> Result<BeatPattern, ValidationError> {
    check_length("beat_name", beat_name, 1, MAX_BEAT_NAME_LEN)?;
    check_length("genre", genre, 1, MAX_GENRE_LEN)?;
    check_bpm(bpm)?;
    validate_beat_schema(beat_schema)
}

/// Validate a new beat, returning its typed pattern
pub fn validate_new_beat(beat: &NewBeat) -> Result<BeatPattern, ValidationError> {
    validate_beat_fields(&beat.beat_name, &beat.genre, beat.bpm, &beat.beat_schema)
}

pub fn validate_beat_update(update: &BeatUpdate) -> Result<BeatPattern, ValidationError> {
    validate_beat_fields(
        &update.beat_name,
        &update.genre,
        update.bpm,
        &update.beat_schema,
    )
}

pub fn validate_new_text(text: &NewText) -> Result<(), ValidationError> {
    check_length("content", &text.content, 1, MAX_TEXT_LEN)
}

pub fn validate_new_page(page: &NewPage) -> Result<(), ValidationError> {
    check_length("title", &page.title, 1, MAX_TITLE_LEN)
}
