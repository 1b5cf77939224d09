//! Password hashing, bearer-token issuance, and the request extractors that
//! turn an `Authorization: Bearer` header into a loaded user.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, models::User, state::AppState, store};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn create_token(user_id: Uuid, secret: &str, ttl_minutes: i64) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {e}")))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::InvalidCredentials)
}

/// The authenticated caller. Rejects with `InvalidCredentials` when the
/// header is missing, the token is invalid or expired, or the user row is
/// gone.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::InvalidCredentials)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidCredentials)?;

        let claims = decode_token(token, &state.config.jwt_secret)?;
        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| ApiError::InvalidCredentials)?;
        let user = store::users::by_id(&state.db, user_id)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;
        Ok(Self(user))
    }
}

/// An authenticated caller with the admin flag set; everything else is
/// `PermissionDenied`.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::PermissionDenied);
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("admin123").unwrap();
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("admin123", "not-a-phc-string"));
    }

    #[test]
    fn token_roundtrip_preserves_subject() {
        let id = Uuid::now_v7();
        let token = create_token(id, "test-secret", 60).unwrap();
        let claims = decode_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_fails_with_wrong_secret() {
        let token = create_token(Uuid::now_v7(), "secret-a", 60).unwrap();
        assert!(matches!(
            decode_token(&token, "secret-b"),
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token(Uuid::now_v7(), "test-secret", -5).unwrap();
        assert!(matches!(
            decode_token(&token, "test-secret"),
            Err(ApiError::InvalidCredentials)
        ));
    }
}
