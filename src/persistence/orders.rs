//! Order persistence: transactional insert of header + items, status update,
//! hydration of the full aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::order::{Order, OrderItem, OrderStatus};

#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub status: String,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Insert an order header and all its items. Takes a connection so checkout
/// commits it together with the stock decrements and the cart clear.
pub async fn insert_order(conn: &mut PgConnection, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (id, buyer_id, status, total_amount, shipping_address, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(order.id)
    .bind(order.buyer_id)
    .bind(order.status.as_str())
    .bind(order.total_amount)
    .bind(&order.shipping_address)
    .bind(order.created_at)
    .execute(&mut *conn)
    .await?;

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, seller_id, product_name, product_image_url, quantity, unit_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(item.id)
        .bind(order.id)
        .bind(item.product_id)
        .bind(item.seller_id)
        .bind(&item.product_name)
        .bind(&item.product_image_url)
        .bind(item.quantity as i32)
        .bind(item.unit_price)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Update order status (status transition endpoint).
pub async fn update_order_status(
    pool: &PgPool,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(order_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// List all order headers for hydration.
pub async fn list_orders(pool: &PgPool) -> Result<Vec<OrderRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, buyer_id, status, total_amount, shipping_address, created_at FROM orders",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List all order items for hydration.
pub async fn list_order_items(pool: &PgPool) -> Result<Vec<OrderItemRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, seller_id, product_name, product_image_url, quantity, unit_price \
         FROM order_items",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Assemble hydration rows into full aggregates. Rows with unknown status or
/// non-positive quantity are skipped.
pub fn rows_to_orders(
    order_rows: &[OrderRow],
    item_rows: &[OrderItemRow],
) -> HashMap<Uuid, Order> {
    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for row in item_rows {
        let Some(quantity) = u32::try_from(row.quantity).ok().filter(|&q| q > 0) else {
            continue;
        };
        items_by_order.entry(row.order_id).or_default().push(OrderItem {
            id: row.id,
            product_id: row.product_id,
            seller_id: row.seller_id,
            product_name: row.product_name.clone(),
            product_image_url: row.product_image_url.clone(),
            quantity,
            unit_price: row.unit_price,
        });
    }

    let mut orders = HashMap::new();
    for row in order_rows {
        let Some(status) = OrderStatus::parse(&row.status) else {
            continue;
        };
        orders.insert(
            row.id,
            Order {
                id: row.id,
                buyer_id: row.buyer_id,
                status,
                total_amount: row.total_amount,
                shipping_address: row.shipping_address.clone(),
                items: items_by_order.remove(&row.id).unwrap_or_default(),
                created_at: row.created_at,
            },
        );
    }
    orders
}
