//! Fixed demo seed: catalog, one admin, three demo shoppers.
//!
//! Seeding is idempotent: users are skipped when their email exists,
//! products are skipped when any exist. `reset` truncates everything and
//! reseeds inside one transaction.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{auth, error::ApiError};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    inventory_count: i32,
    image_url: &'static str,
}

fn sample_products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Acme Rocket Skates",
            description: "High-speed skates for stylish escapes.",
            price: Decimal::new(19999, 2),
            inventory_count: 12,
            image_url: "https://picsum.photos/seed/rocket-skates/400/300",
        },
        SeedProduct {
            name: "Invisibility Cloak",
            description: "Disappear in plain sight with this premium cloak.",
            price: Decimal::new(34950, 2),
            inventory_count: 5,
            image_url: "https://picsum.photos/seed/invisibility-cloak/400/300",
        },
        SeedProduct {
            name: "Quantum Coffee Maker",
            description: "Brew the perfect cup by collapsing the waveform of flavor.",
            price: Decimal::new(12900, 2),
            inventory_count: 20,
            image_url: "https://picsum.photos/seed/quantum-coffee/400/300",
        },
    ]
}

struct SeedUser {
    email: &'static str,
    full_name: &'static str,
    password: &'static str,
    is_admin: bool,
}

const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        email: "admin@example.com",
        full_name: "Store Admin",
        password: "admin123",
        is_admin: true,
    },
    SeedUser {
        email: "user1@example.com",
        full_name: "Demo User 1",
        password: "pass123",
        is_admin: false,
    },
    SeedUser {
        email: "user2@example.com",
        full_name: "Demo User 2",
        password: "pass123",
        is_admin: false,
    },
    SeedUser {
        email: "user3@example.com",
        full_name: "Demo User 3",
        password: "pass123",
        is_admin: false,
    },
];

pub async fn seed(conn: &mut PgConnection) -> Result<(), ApiError> {
    for account in SEED_USERS {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(account.email)
                .fetch_one(&mut *conn)
                .await?;
        if exists {
            continue;
        }
        let password_hash = auth::hash_password(account.password)?;
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, full_name, is_admin)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(account.email)
        .bind(&password_hash)
        .bind(account.full_name)
        .bind(account.is_admin)
        .execute(&mut *conn)
        .await?;
    }

    let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&mut *conn)
        .await?;
    if product_count == 0 {
        for product in sample_products() {
            sqlx::query(
                "INSERT INTO products (id, name, description, price, inventory_count, image_url)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::now_v7())
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .bind(product.inventory_count)
            .bind(product.image_url)
            .execute(&mut *conn)
            .await?;
        }
        tracing::info!(products = sample_products().len(), "seeded demo catalog");
    }

    Ok(())
}

/// Destructive reset: clear every table and reseed. Runs as one transaction
/// so concurrent readers never observe a partially reset store.
pub async fn reset(pool: &PgPool) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query("TRUNCATE order_items, orders, cart_items, products, users CASCADE")
        .execute(&mut *tx)
        .await?;
    seed(&mut tx).await?;
    tx.commit().await?;
    tracing::info!("store reset to seeded state");
    Ok(())
}
