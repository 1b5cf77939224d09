//! Cart endpoints; every operation is scoped to the authenticated caller.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::{validate_payload, ApiError},
    models::{CartItemRead, CartSummary},
    state::AppState,
    store::{
        self,
        cart::{CartItemCreate, CartItemUpdate},
    },
};

pub async fn summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartSummary>, ApiError> {
    let summary = store::cart::summary(&state.db, user.id).await?;
    Ok(Json(summary))
}

pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CartItemCreate>,
) -> Result<(StatusCode, Json<CartItemRead>), ApiError> {
    validate_payload(&payload)?;
    let item = store::cart::add_item(&state.db, user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<CartItemUpdate>,
) -> Result<Json<CartItemRead>, ApiError> {
    validate_payload(&payload)?;
    let item = store::cart::update_item(&state.db, user.id, item_id, payload.quantity).await?;
    Ok(Json(item))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    store::cart::remove_item(&state.db, user.id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
