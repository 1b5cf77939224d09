//! Catalog store: public listing plus admin-gated mutation.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{error::ApiError, models::Product};

fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("price_must_be_positive"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: String,
    #[validate(custom = "positive_price")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub inventory_count: i32,
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; absent or null fields keep their current value. There is
/// no way to clear `image_url` back to null through this payload; replace
/// the value instead.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "positive_price")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub inventory_count: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<Product>, ApiError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE is_active ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>, ApiError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn create(pool: &PgPool, payload: &ProductCreate) -> Result<Product, ApiError> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, description, price, inventory_count, image_url, is_active)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.inventory_count)
    .bind(&payload.image_url)
    .bind(payload.is_active)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    payload: &ProductUpdate,
) -> Result<Product, ApiError> {
    sqlx::query_as::<_, Product>(
        "UPDATE products SET
             name = COALESCE($2, name),
             description = COALESCE($3, description),
             price = COALESCE($4, price),
             inventory_count = COALESCE($5, inventory_count),
             image_url = COALESCE($6, image_url),
             is_active = COALESCE($7, is_active)
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.inventory_count)
    .bind(&payload.image_url)
    .bind(payload.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::NotFound("Product"))
}

/// Remove a product from the catalog. Products referenced by order history
/// are deactivated instead of deleted so past orders stay intact; cart
/// references cascade either way. The order-history check is the foreign
/// key itself: a delete that trips it falls back to deactivation, so a
/// checkout committing concurrently can never surface as an FK error.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
    let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await;

    let result = match deleted {
        Ok(result) => result,
        Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
            sqlx::query("UPDATE products SET is_active = FALSE WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?
        }
        Err(e) => return Err(e.into()),
    };

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Product"));
    }
    Ok(())
}
