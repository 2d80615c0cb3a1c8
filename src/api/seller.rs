//! Seller endpoints: product management and dashboard stats. Open to SELLER
//! and ADMIN roles; sellers only touch their own products.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::persistence;
use crate::types::product::{Product, ProductStatus};

const LOW_STOCK_THRESHOLD: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<ProductStatus>,
}

fn validate(request: &ProductRequest) -> Result<(), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    if request.price < Decimal::ZERO {
        return Err(ApiError::BadRequest("price must not be negative".to_string()));
    }
    if request.stock_quantity < 0 {
        return Err(ApiError::BadRequest(
            "stock_quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// POST /seller/products
pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    auth.require_seller()?;
    validate(&request)?;

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        seller_id: auth.user_id,
        name: request.name.trim().to_string(),
        description: request.description,
        price: request.price,
        stock_quantity: request.stock_quantity,
        category: request.category,
        image_url: request.image_url,
        status: request.status.unwrap_or(ProductStatus::Active),
        created_at: now,
        updated_at: now,
    };
    if let Some(pool) = &state.db {
        persistence::insert_product(pool, &product).await?;
    }
    state.products.write().await.insert(product.id, product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /seller/products — caller's products, newest first.
pub async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    auth.require_seller()?;
    let guard = state.products.read().await;
    let mut products: Vec<Product> = guard
        .values()
        .filter(|p| p.seller_id == auth.user_id)
        .cloned()
        .collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(products))
}

/// PUT /seller/products/{id} — full update. Restocking an OUT_OF_STOCK
/// product reactivates it unless the request pins a status.
pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    auth.require_seller()?;
    validate(&request)?;

    let mut guard = state.products.write().await;
    let product = guard
        .get_mut(&product_id)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
    if product.seller_id != auth.user_id && !auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Not authorized to update this product".to_string(),
        ));
    }

    product.name = request.name.trim().to_string();
    product.description = request.description;
    product.price = request.price;
    product.stock_quantity = request.stock_quantity;
    product.category = request.category;
    product.image_url = request.image_url;
    product.status = match request.status {
        Some(status) => status,
        None if product.status == ProductStatus::OutOfStock && request.stock_quantity > 0 => {
            ProductStatus::Active
        }
        None => product.status,
    };
    product.updated_at = Utc::now();
    let updated = product.clone();
    drop(guard);

    if let Some(pool) = &state.db {
        persistence::update_product(pool, &updated).await?;
    }
    Ok(Json(updated))
}

/// DELETE /seller/products/{id} — also drops cart lines referencing the
/// product; order item snapshots are untouched.
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_seller()?;

    let mut guard = state.products.write().await;
    let product = guard
        .get(&product_id)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
    if product.seller_id != auth.user_id && !auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this product".to_string(),
        ));
    }
    guard.remove(&product_id);
    drop(guard);

    let mut carts = state.carts.write().await;
    for items in carts.values_mut() {
        items.retain(|item| item.product_id != product_id);
    }
    carts.retain(|_, items| !items.is_empty());
    drop(carts);

    if let Some(pool) = &state.db {
        persistence::delete_product(pool, product_id).await?;
        persistence::delete_cart_items_for_product(pool, product_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub low_stock_count: usize,
    pub units_sold: u64,
    pub gross_revenue: Decimal,
}

/// GET /seller/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardStats>, ApiError> {
    auth.require_seller()?;

    let products = state.products.read().await;
    let total_products = products
        .values()
        .filter(|p| p.seller_id == auth.user_id)
        .count();
    let low_stock_count = products
        .values()
        .filter(|p| p.seller_id == auth.user_id && p.stock_quantity < LOW_STOCK_THRESHOLD)
        .count();
    drop(products);

    let orders = state.orders.read().await;
    let mut units_sold = 0u64;
    let mut gross_revenue = Decimal::ZERO;
    for order in orders.values() {
        for item in order.items.iter().filter(|i| i.seller_id == auth.user_id) {
            units_sold += u64::from(item.quantity);
            gross_revenue += item.subtotal();
        }
    }

    Ok(Json(DashboardStats {
        total_products,
        low_stock_count,
        units_sold,
        gross_revenue,
    }))
}
