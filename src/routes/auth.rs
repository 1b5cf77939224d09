//! Registration, login, and the current-user endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    auth::{create_token, hash_password, verify_password, CurrentUser},
    error::{validate_payload, ApiError},
    models::UserRead,
    state::AppState,
    store,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Registration always creates a shopper; admin status is only ever granted
/// through the admin directory.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserRead>), ApiError> {
    validate_payload(&payload)?;
    let password_hash = hash_password(&payload.password)?;
    let user = store::users::create(
        &state.db,
        &payload.email,
        &password_hash,
        payload.full_name.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = store::users::by_email(&state.db, &payload.email).await?;
    // Same error for unknown email and wrong password.
    let user = user
        .filter(|u| verify_password(&payload.password, &u.password_hash))
        .ok_or(ApiError::InvalidCredentials)?;

    let ttl = state.config.token_ttl_minutes;
    let access_token = create_token(user.id, &state.config.jwt_secret, ttl)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: ttl * 60,
    }))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserRead> {
    Json(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_short_password_and_bad_email() {
        let payload = RegisterRequest {
            email: "not-an-email".into(),
            password: "short".into(),
            full_name: None,
        };
        let err = payload.validate().unwrap_err();
        assert!(err.field_errors().contains_key("email"));
        assert!(err.field_errors().contains_key("password"));
    }

    #[test]
    fn register_accepts_minimal_payload() {
        let payload = RegisterRequest {
            email: "shopper@example.com".into(),
            password: "pass123".into(),
            full_name: None,
        };
        assert!(payload.validate().is_ok());
    }
}
