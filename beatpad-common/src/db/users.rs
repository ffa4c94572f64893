//! User account queries

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{ConflictError, Error, NotFoundError, Result};
use crate::fields::validate_new_user;
use crate::models::{NewUser, User};
use crate::password::{generate_salt, hash_password};

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let level: String = row.get("level");
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        level: level
            .parse()
            .map_err(|_| Error::Internal(format!("stored user level '{level}' is invalid")))?,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

/// Register a new account.
///
/// Email is checked before username, so a request colliding on both
/// reports the email.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User> {
    let level = validate_new_user(new_user)?;

    let email_taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
        .bind(&new_user.email)
        .fetch_one(pool)
        .await?;
    if email_taken {
        return Err(ConflictError::DuplicateEmail(new_user.email.clone()).into());
    }

    let username_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(&new_user.username)
            .fetch_one(pool)
            .await?;
    if username_taken {
        return Err(ConflictError::DuplicateUsername(new_user.username.clone()).into());
    }

    let salt = generate_salt();
    let created_at = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, level, password_hash, password_salt, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(level.as_str())
    .bind(hash_password(&new_user.password, &salt))
    .bind(&salt)
    .bind(created_at)
    .execute(pool)
    .await
    .map_err(|e| unique_violation_to_conflict(e, new_user))?;

    let id = result.last_insert_rowid();
    info!("Registered user {} ({})", id, new_user.username);

    Ok(User {
        id,
        username: new_user.username.clone(),
        email: new_user.email.clone(),
        level,
        created_at,
    })
}

/// A concurrent registration can still slip past the pre-checks; the
/// UNIQUE constraints catch it.
fn unique_violation_to_conflict(err: sqlx::Error, new_user: &NewUser) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return if db_err.message().contains("users.email") {
                ConflictError::DuplicateEmail(new_user.email.clone()).into()
            } else {
                ConflictError::DuplicateUsername(new_user.username.clone()).into()
            };
        }
    }
    err.into()
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query("SELECT id, username, email, level, created_at FROM users ORDER BY id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(user_from_row).collect()
}

pub async fn get_user(pool: &SqlitePool, user_id: i64) -> Result<User> {
    let row = sqlx::query("SELECT id, username, email, level, created_at FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(NotFoundError::User(user_id))?;
    user_from_row(&row)
}

/// Fails with `NotFound(User)` when the owner does not exist
pub async fn ensure_user_exists(pool: &SqlitePool, user_id: i64) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(NotFoundError::User(user_id).into())
    }
}

/// Delete a user; their beats, texts and pages go with them
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(NotFoundError::User(user_id).into());
    }
    info!("Deleted user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use crate::error::ValidationError;

    async fn password_material(pool: &SqlitePool, user_id: i64) -> (String, String) {
        sqlx::query_as("SELECT password_hash, password_salt FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn ringo() -> NewUser {
        NewUser {
            username: "ringo".into(),
            email: "ringo@example.com".into(),
            level: "intermediate".into(),
            password: "octopus".into(),
        }
    }

    #[tokio::test]
    async fn register_and_list() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, &ringo()).await.unwrap();

        let users = list_users(&pool).await.unwrap();
        assert_eq!(users, vec![user.clone()]);
        assert_eq!(get_user(&pool, user.id).await.unwrap().email, "ringo@example.com");
    }

    #[tokio::test]
    async fn password_is_salted_hash() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, &ringo()).await.unwrap();

        let (hash, salt) = password_material(&pool, user.id).await;
        assert_ne!(hash, "octopus");
        assert_eq!(hash, hash_password("octopus", &salt));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let pool = init_memory_database().await.unwrap();
        create_user(&pool, &ringo()).await.unwrap();

        let mut other = ringo();
        other.username = "starr".into();
        let err = create_user(&pool, &other).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Conflict(ConflictError::DuplicateEmail(ref e)) if e == "ringo@example.com"
        ));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let pool = init_memory_database().await.unwrap();
        create_user(&pool, &ringo()).await.unwrap();

        let mut other = ringo();
        other.email = "starr@example.com".into();
        let err = create_user(&pool, &other).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Conflict(ConflictError::DuplicateUsername(ref u)) if u == "ringo"
        ));
    }

    #[tokio::test]
    async fn invalid_fields_rejected_before_insert() {
        let pool = init_memory_database().await.unwrap();
        let mut bad = ringo();
        bad.level = "virtuoso".into();

        let err = create_user(&pool, &bad).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidField { field: "level", .. })
        ));
        assert!(list_users(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let pool = init_memory_database().await.unwrap();
        assert!(matches!(
            delete_user(&pool, 99).await,
            Err(Error::NotFound(NotFoundError::User(99)))
        ));
        assert!(matches!(
            ensure_user_exists(&pool, 99).await,
            Err(Error::NotFound(NotFoundError::User(99)))
        ));
    }
}
