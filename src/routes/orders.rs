//! Checkout and order history for the authenticated caller.

use axum::{extract::State, http::StatusCode, Json};

use crate::{auth::CurrentUser, error::ApiError, models::OrderRead, state::AppState, store};

pub async fn checkout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<(StatusCode, Json<OrderRead>), ApiError> {
    let order = store::orders::checkout(&state.db, user.id).await?;
    tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<OrderRead>>, ApiError> {
    let orders = store::orders::list_for_user(&state.db, user.id).await?;
    Ok(Json(orders))
}
