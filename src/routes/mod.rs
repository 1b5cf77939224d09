//! HTTP surface: maps the store operations onto `/api/v1` endpoints.

use axum::{
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

mod admin;
mod auth;
mod cart;
mod orders;
mod products;

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/users/me", get(auth::me))
        .route("/api/v1/products", get(products::list).post(products::create))
        .route(
            "/api/v1/products/:id",
            put(products::update).delete(products::remove),
        )
        .route("/api/v1/cart", get(cart::summary))
        .route("/api/v1/cart/items", post(cart::add))
        .route(
            "/api/v1/cart/items/:id",
            put(cart::update).delete(cart::remove),
        )
        .route("/api/v1/orders", get(orders::list).post(orders::checkout))
        .route("/api/v1/admin/reset", post(admin::reset))
        .route("/api/v1/admin/users", get(admin::list_users))
        .route("/api/v1/admin/users/:id", patch(admin::set_admin));

    if state.config.frontend_dir.is_dir() {
        app = app.fallback_service(ServeDir::new(&state.config.frontend_dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "commerce-demo"}))
}
