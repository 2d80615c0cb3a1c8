//! Cart persistence: per-buyer line items, hydration, and the clear used by
//! both the cart API and the checkout transaction.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::types::cart::CartItem;

#[derive(Debug, FromRow)]
pub struct CartItemRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Convert a row to a CartItem. Skips rows with non-positive quantity.
pub fn cart_item_row_to_item(row: &CartItemRow) -> Option<CartItem> {
    let quantity = u32::try_from(row.quantity).ok().filter(|&q| q > 0)?;
    Some(CartItem {
        id: row.id,
        product_id: row.product_id,
        seller_id: row.seller_id,
        quantity,
        unit_price: row.unit_price,
    })
}

/// List all cart items for hydration.
pub async fn list_cart_items(pool: &PgPool) -> Result<Vec<CartItemRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        "SELECT id, buyer_id, product_id, seller_id, quantity, unit_price FROM cart_items",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert or bump a cart line (one row per buyer/product pair).
pub async fn upsert_cart_item(
    pool: &PgPool,
    buyer_id: Uuid,
    item: &CartItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO cart_items (id, buyer_id, product_id, seller_id, quantity, unit_price) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (buyer_id, product_id) DO UPDATE SET quantity = $5, unit_price = $6",
    )
    .bind(item.id)
    .bind(buyer_id)
    .bind(item.product_id)
    .bind(item.seller_id)
    .bind(item.quantity as i32)
    .bind(item.unit_price)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_cart_item_quantity(
    pool: &PgPool,
    item_id: Uuid,
    quantity: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE cart_items SET quantity = $1 WHERE id = $2")
        .bind(quantity as i32)
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_cart_item(pool: &PgPool, item_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete every line in a buyer's cart. Takes a connection so checkout can
/// run it inside the placement transaction.
pub async fn clear_cart(conn: &mut PgConnection, buyer_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE buyer_id = $1")
        .bind(buyer_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Delete every cart line referencing a product (product removal).
pub async fn delete_cart_items_for_product(
    pool: &PgPool,
    product_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE product_id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(())
}
