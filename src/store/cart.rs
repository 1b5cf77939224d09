//! Cart engine: per-user (product, quantity) rows with stock-aware
//! validation and a read-time subtotal.
//!
//! Stock checks here are advisory; checkout re-validates under row locks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::ApiError,
    models::{CartItemRead, CartSummary, Product},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CartItemCreate {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CartItemUpdate {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Quantity a cart row would hold after merging a new add into it.
fn merged_quantity(existing: Option<i32>, requested: i32) -> i32 {
    existing.unwrap_or(0).saturating_add(requested)
}

fn ensure_stock(product: &str, requested: i32, available: i32) -> Result<(), ApiError> {
    if requested > available {
        return Err(ApiError::InsufficientStock {
            product: product.to_string(),
        });
    }
    Ok(())
}

/// `Σ quantity × current price`, computed from the rows handed in.
pub fn subtotal(items: &[CartItemRead]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, item| {
            acc + item.product.price * Decimal::from(item.quantity)
        })
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    quantity: i32,
    added_at: DateTime<Utc>,
    product_id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    inventory_count: i32,
    image_url: Option<String>,
    is_active: bool,
    product_created_at: DateTime<Utc>,
}

impl From<CartRow> for CartItemRead {
    fn from(row: CartRow) -> Self {
        Self {
            id: row.id,
            quantity: row.quantity,
            added_at: row.added_at,
            product: Product {
                id: row.product_id,
                name: row.name,
                description: row.description,
                price: row.price,
                inventory_count: row.inventory_count,
                image_url: row.image_url,
                is_active: row.is_active,
                created_at: row.product_created_at,
            },
        }
    }
}

const CART_SELECT: &str = "SELECT ci.id, ci.quantity, ci.added_at,
        p.id AS product_id, p.name, p.description, p.price, p.inventory_count,
        p.image_url, p.is_active, p.created_at AS product_created_at
     FROM cart_items ci JOIN products p ON p.id = ci.product_id";

pub async fn items(pool: &PgPool, user_id: Uuid) -> Result<Vec<CartItemRead>, ApiError> {
    let rows = sqlx::query_as::<_, CartRow>(
        &format!("{CART_SELECT} WHERE ci.user_id = $1 ORDER BY ci.added_at"),
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CartItemRead::from).collect())
}

pub async fn summary(pool: &PgPool, user_id: Uuid) -> Result<CartSummary, ApiError> {
    let items = items(pool, user_id).await?;
    let subtotal = subtotal(&items);
    Ok(CartSummary { items, subtotal })
}

/// Add a product to the cart, merging into an existing row if present.
/// At most one cart row ever exists per (user, product); the unique
/// constraint backs the upsert.
pub async fn add_item(
    pool: &PgPool,
    user_id: Uuid,
    payload: &CartItemCreate,
) -> Result<CartItemRead, ApiError> {
    let product = super::products::by_id(pool, payload.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(ApiError::NotFound("Product"))?;

    let existing: Option<i32> = sqlx::query_scalar(
        "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2",
    )
    .bind(user_id)
    .bind(payload.product_id)
    .fetch_optional(pool)
    .await?;

    let new_quantity = merged_quantity(existing, payload.quantity);
    ensure_stock(&product.name, new_quantity, product.inventory_count)?;

    let (id, quantity, added_at): (Uuid, i32, DateTime<Utc>) = sqlx::query_as(
        "INSERT INTO cart_items (id, user_id, product_id, quantity)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id, product_id)
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
         RETURNING id, quantity, added_at",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    Ok(CartItemRead {
        id,
        product,
        quantity,
        added_at,
    })
}

pub async fn update_item(
    pool: &PgPool,
    user_id: Uuid,
    item_id: Uuid,
    quantity: i32,
) -> Result<CartItemRead, ApiError> {
    if quantity < 1 {
        return Err(ApiError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, CartRow>(&format!(
        "{CART_SELECT} WHERE ci.id = $1 AND ci.user_id = $2"
    ))
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::NotFound("Cart item"))?;

    ensure_stock(&row.name, quantity, row.inventory_count)?;

    let mut item = CartItemRead::from(row);
    sqlx::query("UPDATE cart_items SET quantity = $2 WHERE id = $1")
        .bind(item_id)
        .bind(quantity)
        .execute(pool)
        .await?;
    item.quantity = quantity;
    Ok(item)
}

pub async fn remove_item(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Cart item"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(price: Decimal) -> Product {
        Product {
            id: Uuid::now_v7(),
            name: "Widget".into(),
            description: "A widget".into(),
            price,
            inventory_count: 100,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn item(price: Decimal, quantity: i32) -> CartItemRead {
        CartItemRead {
            id: Uuid::now_v7(),
            product: product(price),
            quantity,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn merge_adds_to_existing_quantity() {
        assert_eq!(merged_quantity(None, 3), 3);
        assert_eq!(merged_quantity(Some(2), 3), 5);
    }

    #[test]
    fn merge_saturates_instead_of_overflowing() {
        assert_eq!(merged_quantity(Some(i32::MAX), 1), i32::MAX);
    }

    #[test]
    fn stock_check_allows_exact_inventory() {
        assert!(ensure_stock("Widget", 5, 5).is_ok());
    }

    #[test]
    fn stock_check_names_the_offending_product() {
        let err = ensure_stock("Rocket Skates", 3, 2).unwrap_err();
        match err {
            ApiError::InsufficientStock { product } => assert_eq!(product, "Rocket Skates"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn subtotal_is_sum_of_quantity_times_price() {
        let items = vec![item(dec!(199.99), 2), item(dec!(129.00), 1)];
        assert_eq!(subtotal(&items), dec!(528.98));
    }

    #[test]
    fn subtotal_of_empty_cart_is_zero() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn quantity_payloads_reject_zero() {
        let payload = CartItemUpdate { quantity: 0 };
        assert!(payload.validate().is_err());
        let payload = CartItemCreate {
            product_id: Uuid::now_v7(),
            quantity: 0,
        };
        assert!(payload.validate().is_err());
    }
}
