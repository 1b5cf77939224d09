//! Admin utilities: destructive reset and the user directory.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{auth::AdminUser, error::ApiError, models::UserRead, state::AppState, store};

pub async fn reset(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    store::seed::reset(&state.db).await?;
    tracing::info!(admin = %admin.email, "store reset requested");
    Ok(Json(json!({"status": "ok", "detail": "Store reset to seeded state"})))
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<UserRead>>, ApiError> {
    let users = store::users::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserRead::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct AdminUserUpdate {
    pub is_admin: bool,
}

/// Flip a user's admin flag. An admin cannot demote themselves, and the
/// last remaining admin cannot be demoted; the latter guard runs under row
/// locks in the store so concurrent demotions cannot jointly pass it.
pub async fn set_admin(
    State(state): State<AppState>,
    AdminUser(caller): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<Json<UserRead>, ApiError> {
    if payload.is_admin {
        let user = store::users::set_admin(&state.db, user_id, true).await?;
        return Ok(Json(user.into()));
    }

    if user_id == caller.id {
        return Err(ApiError::Validation(
            "You cannot remove your own admin access".to_string(),
        ));
    }
    let user = store::users::demote(&state.db, user_id).await?;
    Ok(Json(user.into()))
}
