//! User rows: lookup, registration, and the admin directory.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::ApiError, models::User};

pub async fn by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Insert a new user. The unique constraint on email is the source of truth
/// for duplicates; a violation surfaces as `EmailTaken`.
pub async fn create(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    full_name: Option<&str>,
) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password_hash, full_name, is_admin)
         VALUES ($1, $2, $3, $4, FALSE) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return ApiError::EmailTaken;
            }
        }
        ApiError::Database(e)
    })
}

pub async fn list(pool: &PgPool) -> Result<Vec<User>, ApiError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    Ok(users)
}

pub async fn count_admins(pool: &PgPool) -> Result<i64, ApiError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_admin")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn set_admin(pool: &PgPool, id: Uuid, is_admin: bool) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>("UPDATE users SET is_admin = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(is_admin)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

/// Clear a user's admin flag, refusing to leave the store without any
/// admin. The admin rows are locked for the check-then-update so two
/// concurrent demotions serialize instead of jointly removing the last
/// admin.
pub async fn demote(pool: &PgPool, id: Uuid) -> Result<User, ApiError> {
    let mut tx = pool.begin().await?;

    let admin_ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE is_admin ORDER BY id FOR UPDATE")
            .fetch_all(&mut *tx)
            .await?;
    if admin_ids.contains(&id) && admin_ids.len() <= 1 {
        return Err(ApiError::Validation(
            "At least one admin account must remain".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET is_admin = FALSE WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("User"))?;

    tx.commit().await?;
    Ok(user)
}
