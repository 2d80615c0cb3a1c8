//! Product persistence: CRUD, hydration, and the conditional stock decrement
//! used inside the checkout transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::types::product::{Product, ProductStatus};

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Convert a row to a Product. Skips rows with an unknown status string.
pub fn product_row_to_product(row: &ProductRow) -> Option<Product> {
    Some(Product {
        id: row.id,
        seller_id: row.seller_id,
        name: row.name.clone(),
        description: row.description.clone(),
        price: row.price,
        stock_quantity: row.stock_quantity,
        category: row.category.clone(),
        image_url: row.image_url.clone(),
        status: ProductStatus::parse(&row.status)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// List all products for hydration.
pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, seller_id, name, description, price, stock_quantity, category, image_url, status, created_at, updated_at \
         FROM products",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert a product (seller create).
pub async fn insert_product(pool: &PgPool, product: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, seller_id, name, description, price, stock_quantity, category, image_url, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(product.id)
    .bind(product.seller_id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock_quantity)
    .bind(&product.category)
    .bind(&product.image_url)
    .bind(product.status.as_str())
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Overwrite all mutable columns (seller update).
pub async fn update_product(pool: &PgPool, product: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE products SET name = $1, description = $2, price = $3, stock_quantity = $4, \
         category = $5, image_url = $6, status = $7, updated_at = $8 WHERE id = $9",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock_quantity)
    .bind(&product.category)
    .bind(&product.image_url)
    .bind(product.status.as_str())
    .bind(product.updated_at)
    .bind(product.id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a product row.
pub async fn delete_product(pool: &PgPool, product_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Atomic conditional decrement inside the checkout transaction. The guard
/// `stock_quantity >= $2` makes overselling impossible regardless of other
/// writers; status flips to OUT_OF_STOCK when the counter lands on zero.
/// Returns false when stock was insufficient (zero rows matched).
pub async fn decrement_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET \
           stock_quantity = stock_quantity - $2, \
           status = CASE WHEN stock_quantity - $2 = 0 THEN 'OUT_OF_STOCK' ELSE status END, \
           updated_at = NOW() \
         WHERE id = $1 AND stock_quantity >= $2",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
