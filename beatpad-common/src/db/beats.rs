//! Beat queries
//!
//! Patterns are validated before every write and stored as JSON text in
//! declaration order.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::beat_schema::validate_beat_schema;
use crate::db::users::ensure_user_exists;
use crate::error::{Error, NotFoundError, Result};
use crate::fields::{validate_beat_update, validate_new_beat};
use crate::models::{Beat, BeatUpdate, NewBeat};

const BEAT_COLUMNS: &str =
    "id, beat_name, genre, bpm, beat_schema, user_id, created_at, updated_at";

fn beat_from_row(row: &SqliteRow) -> Result<Beat> {
    let id: i64 = row.get("id");
    let raw: String = row.get("beat_schema");
    let document: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| Error::Internal(format!("beat {id} has unreadable pattern: {e}")))?;
    let beat_schema = validate_beat_schema(&document)
        .map_err(|e| Error::Internal(format!("beat {id} has invalid stored pattern: {e}")))?;

    Ok(Beat {
        id,
        beat_name: row.get("beat_name"),
        genre: row.get("genre"),
        bpm: row.get("bpm"),
        beat_schema,
        user_id: row.get("user_id"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

pub async fn create_beat(pool: &SqlitePool, new_beat: &NewBeat) -> Result<Beat> {
    let beat_schema = validate_new_beat(new_beat)?;
    ensure_user_exists(pool, new_beat.user_id).await?;

    let now = Utc::now();
    let stored = serde_json::to_string(&beat_schema)
        .map_err(|e| Error::Internal(format!("pattern does not serialize: {e}")))?;
    let result = sqlx::query(
        r#"
        INSERT INTO beats (beat_name, genre, bpm, beat_schema, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new_beat.beat_name)
    .bind(&new_beat.genre)
    .bind(new_beat.bpm)
    .bind(stored)
    .bind(new_beat.user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!("Created beat {} '{}' for user {}", id, new_beat.beat_name, new_beat.user_id);

    Ok(Beat {
        id,
        beat_name: new_beat.beat_name.clone(),
        genre: new_beat.genre.clone(),
        bpm: new_beat.bpm,
        beat_schema,
        user_id: new_beat.user_id,
        created_at: now,
        updated_at: now,
    })
}

pub async fn list_beats(pool: &SqlitePool) -> Result<Vec<Beat>> {
    let rows = sqlx::query(&format!("SELECT {BEAT_COLUMNS} FROM beats ORDER BY id"))
        .fetch_all(pool)
        .await?;
    rows.iter().map(beat_from_row).collect()
}

pub async fn get_beat(pool: &SqlitePool, beat_id: i64) -> Result<Beat> {
    let row = sqlx::query(&format!("SELECT {BEAT_COLUMNS} FROM beats WHERE id = ?"))
        .bind(beat_id)
        .fetch_optional(pool)
        .await?
        .ok_or(NotFoundError::Beat(beat_id))?;
    beat_from_row(&row)
}

/// Replace name, genre, tempo and pattern; identity and owner are fixed
pub async fn update_beat(pool: &SqlitePool, beat_id: i64, update: &BeatUpdate) -> Result<Beat> {
    let beat_schema = validate_beat_update(update)?;
    let stored = serde_json::to_string(&beat_schema)
        .map_err(|e| Error::Internal(format!("pattern does not serialize: {e}")))?;

    let result = sqlx::query(
        r#"
        UPDATE beats
        SET beat_name = ?, genre = ?, bpm = ?, beat_schema = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&update.beat_name)
    .bind(&update.genre)
    .bind(update.bpm)
    .bind(stored)
    .bind(Utc::now())
    .bind(beat_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(NotFoundError::Beat(beat_id).into());
    }
    info!("Updated beat {}", beat_id);
    get_beat(pool, beat_id).await
}

/// Delete a beat. Blocks that reference it are left in place.
pub async fn delete_beat(pool: &SqlitePool, beat_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM beats WHERE id = ?")
        .bind(beat_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(NotFoundError::Beat(beat_id).into());
    }
    info!("Deleted beat {}", beat_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use crate::db::users::create_user;
    use crate::error::ValidationError;
    use crate::models::NewUser;
    use serde_json::json;

    async fn setup() -> (SqlitePool, i64) {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(
            &pool,
            &NewUser {
                username: "sheila".into(),
                email: "sheila@example.com".into(),
                level: "advanced".into(),
                password: "glamorous".into(),
            },
        )
        .await
        .unwrap();
        (pool, user.id)
    }

    fn new_beat(user_id: i64) -> NewBeat {
        NewBeat {
            beat_name: "Four on the floor".into(),
            genre: "house".into(),
            bpm: 124,
            beat_schema: json!({
                "kick": [[1, 0, 0, 0, 1, 0, 0, 0]],
                "snare": [[0, 0, 0, 0, 0, 0, 0, 0]],
                "high-hat": [[0, 0, 1, 0, 0, 0, 1, 0]],
                "tom1": [[0, 0, 0, 0, 0, 0, 0, 0]],
                "tom2": [[0, 0, 0, 0, 0, 0, 0, 0]],
                "clap": [[0, 0, 0, 0, 1, 0, 0, 0]]
            }),
            user_id,
        }
    }

    #[tokio::test]
    async fn stored_pattern_reads_back_identically() {
        let (pool, user_id) = setup().await;
        let beat = create_beat(&pool, &new_beat(user_id)).await.unwrap();

        let fetched = get_beat(&pool, beat.id).await.unwrap();
        assert_eq!(fetched.beat_schema, beat.beat_schema);
        assert_eq!(fetched.beat_schema.to_value(), new_beat(user_id).beat_schema);
        assert_eq!(list_beats(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_pattern_is_not_stored() {
        let (pool, user_id) = setup().await;
        let mut beat = new_beat(user_id);
        beat.beat_schema["kick"] = json!([[1, "x"]]);

        let err = create_beat(&pool, &beat).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MalformedStep { ref instrument }) if instrument == "kick"
        ));
        assert!(list_beats(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found() {
        let (pool, _) = setup().await;
        let err = create_beat(&pool, &new_beat(404)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFoundError::User(404))));
    }

    #[tokio::test]
    async fn update_replaces_mutable_fields() {
        let (pool, user_id) = setup().await;
        let beat = create_beat(&pool, &new_beat(user_id)).await.unwrap();

        let mut pattern = new_beat(user_id).beat_schema;
        pattern["snare"] = json!([[0, 0, 1, 0, 0, 0, 1, 0]]);
        let updated = update_beat(
            &pool,
            beat.id,
            &BeatUpdate {
                beat_name: "Garage".into(),
                genre: "uk garage".into(),
                bpm: 132,
                beat_schema: pattern.clone(),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.id, beat.id);
        assert_eq!(updated.user_id, user_id);
        assert_eq!(updated.bpm, 132);
        assert_eq!(updated.beat_schema.to_value(), pattern);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_beat() {
        let (pool, _) = setup().await;
        let update = BeatUpdate {
            beat_name: "x".into(),
            genre: "y".into(),
            bpm: 90,
            beat_schema: new_beat(1).beat_schema,
        };
        assert!(matches!(
            update_beat(&pool, 5, &update).await,
            Err(Error::NotFound(NotFoundError::Beat(5)))
        ));
        assert!(matches!(
            delete_beat(&pool, 5).await,
            Err(Error::NotFound(NotFoundError::Beat(5)))
        ));
    }
}
