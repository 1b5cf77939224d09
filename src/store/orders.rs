//! Checkout and order history.
//!
//! Checkout runs in a single transaction with the product rows locked, so
//! either every stock decrement and the order rows land together, or the
//! store is left untouched. Two concurrent checkouts of the same scarce
//! product serialize on the row lock; the loser sees the decremented
//! inventory and fails cleanly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Order, OrderItemRead, OrderRead, Product},
};

#[derive(sqlx::FromRow)]
struct CheckoutRow {
    quantity: i32,
    product_id: Uuid,
    name: String,
    price: Decimal,
    inventory_count: i32,
}

/// Convert the caller's cart into an immutable order, decrementing stock.
pub async fn checkout(pool: &PgPool, user_id: Uuid) -> Result<OrderRead, ApiError> {
    let mut tx = pool.begin().await?;

    // Lock the product rows for the whole check-then-decrement sequence.
    // Locks are acquired in product-id order so two checkouts holding the
    // same products in different cart order cannot deadlock.
    let rows = sqlx::query_as::<_, CheckoutRow>(
        "SELECT ci.quantity, p.id AS product_id, p.name, p.price, p.inventory_count
         FROM cart_items ci JOIN products p ON p.id = ci.product_id
         WHERE ci.user_id = $1
         ORDER BY p.id
         FOR UPDATE OF p",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    if rows.is_empty() {
        return Err(ApiError::EmptyCart);
    }
    for row in &rows {
        if row.quantity > row.inventory_count {
            return Err(ApiError::InsufficientStock {
                product: row.name.clone(),
            });
        }
    }

    let total: Decimal = rows
        .iter()
        .fold(Decimal::ZERO, |acc, r| {
            acc + r.price * Decimal::from(r.quantity)
        });

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, user_id, total_amount) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    for row in &rows {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(order.id)
        .bind(row.product_id)
        .bind(row.quantity)
        .bind(row.price)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE products SET inventory_count = inventory_count - $2 WHERE id = $1",
        )
        .bind(row.product_id)
        .bind(row.quantity)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let order_id = order.id;
    let mut items = items_for_orders(pool, &[order_id]).await?;
    Ok(read_from(order, items.remove(&order_id).unwrap_or_default()))
}

/// The caller's orders, newest first, with their frozen item snapshots.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<OrderRead>, ApiError> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items = items_for_orders(pool, &ids).await?;
    Ok(orders
        .into_iter()
        .map(|order| {
            let order_items = items.remove(&order.id).unwrap_or_default();
            read_from(order, order_items)
        })
        .collect())
}

fn read_from(order: Order, items: Vec<OrderItemRead>) -> OrderRead {
    OrderRead {
        id: order.id,
        status: order.status,
        total_amount: order.total_amount,
        created_at: order.created_at,
        items,
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    product_id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    inventory_count: i32,
    image_url: Option<String>,
    is_active: bool,
    product_created_at: DateTime<Utc>,
}

async fn items_for_orders(
    pool: &PgPool,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OrderItemRead>>, ApiError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT oi.id, oi.order_id, oi.quantity, oi.unit_price,
                p.id AS product_id, p.name, p.description, p.price, p.inventory_count,
                p.image_url, p.is_active, p.created_at AS product_created_at
         FROM order_items oi JOIN products p ON p.id = oi.product_id
         WHERE oi.order_id = ANY($1)
         ORDER BY oi.id",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<OrderItemRead>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(OrderItemRead {
            id: row.id,
            quantity: row.quantity,
            unit_price: row.unit_price,
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
        });
    }
    Ok(grouped)
}
