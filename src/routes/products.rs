//! Catalog endpoints. Listing is public; mutation requires an admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    error::{validate_payload, ApiError},
    models::Product,
    state::AppState,
    store::{
        self,
        products::{ProductCreate, ProductUpdate},
    },
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = store::products::list_active(&state.db).await?;
    Ok(Json(products))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(payload): Json<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    validate_payload(&payload)?;
    let product = store::products::create(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    validate_payload(&payload)?;
    let product = store::products::update(&state.db, id, &payload).await?;
    Ok(Json(product))
}

pub async fn remove(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    store::products::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
