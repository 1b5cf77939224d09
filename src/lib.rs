//! Commerce Demo - API-driven storefront
//!
//! A demo ecommerce backend: JSON API for authentication, product catalog,
//! per-user shopping cart, and atomic checkout, backed by PostgreSQL.
//!
//! ## Features
//! - Bearer-token authentication (shopper and admin roles)
//! - Product catalog with admin-gated mutation and soft-delete
//! - Stock-aware cart with read-time subtotal
//! - Transactional checkout that freezes prices and decrements inventory
//! - Admin reset/reseed and user directory

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;
