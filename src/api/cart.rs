//! Cart endpoints. Lines keep the price captured when the product was added;
//! checkout re-reads live catalog prices, so the cart total is advisory.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::persistence;
use crate::types::cart::CartItem;
use crate::types::product::{Product, ProductStatus};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total: Decimal,
}

fn build_cart_response(products: &HashMap<Uuid, Product>, items: &[CartItem]) -> CartResponse {
    let mut total = Decimal::ZERO;
    let items = items
        .iter()
        .map(|item| {
            let (name, image) = match products.get(&item.product_id) {
                Some(product) => (product.name.clone(), product.image_url.clone()),
                None => (String::new(), None),
            };
            let subtotal = item.unit_price * Decimal::from(item.quantity);
            total += subtotal;
            CartItemResponse {
                id: item.id,
                product_id: item.product_id,
                seller_id: item.seller_id,
                product_name: name,
                product_image_url: image,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal,
            }
        })
        .collect();
    CartResponse { items, total }
}

/// GET /cart — an absent cart reads as empty.
pub async fn get_cart(State(state): State<AppState>, auth: AuthUser) -> Json<CartResponse> {
    let products = state.products.read().await;
    let carts = state.carts.read().await;
    let items = carts.get(&auth.user_id).map(Vec::as_slice).unwrap_or(&[]);
    Json(build_cart_response(&products, items))
}

/// POST /cart/items — adding a product already in the cart bumps its
/// quantity.
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    if request.quantity == 0 {
        return Err(ApiError::BadRequest("Quantity must be at least 1".to_string()));
    }

    let products = state.products.read().await;
    let product = products
        .get(&request.product_id)
        .filter(|p| p.status != ProductStatus::Inactive)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
    let (seller_id, unit_price) = (product.seller_id, product.price);

    let mut carts = state.carts.write().await;
    let items = carts.entry(auth.user_id).or_default();
    let written = match items.iter_mut().find(|i| i.product_id == request.product_id) {
        Some(existing) => {
            existing.quantity += request.quantity;
            existing.clone()
        }
        None => {
            let item = CartItem {
                id: Uuid::new_v4(),
                product_id: request.product_id,
                seller_id,
                quantity: request.quantity,
                unit_price,
            };
            items.push(item.clone());
            item
        }
    };
    let snapshot = items.clone();
    drop(carts);

    if let Some(pool) = &state.db {
        persistence::upsert_cart_item(pool, auth.user_id, &written).await?;
    }
    Ok((
        StatusCode::CREATED,
        Json(build_cart_response(&products, &snapshot)),
    ))
}

/// PATCH /cart/items/{id} — quantity 0 removes the line.
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let products = state.products.read().await;
    let mut carts = state.carts.write().await;
    let items = carts
        .get_mut(&auth.user_id)
        .ok_or_else(|| ApiError::NotFound("Cart item not found".to_string()))?;
    let position = items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| ApiError::NotFound("Cart item not found".to_string()))?;

    if request.quantity == 0 {
        items.remove(position);
    } else {
        items[position].quantity = request.quantity;
    }
    let snapshot = items.clone();
    drop(carts);

    if let Some(pool) = &state.db {
        if request.quantity == 0 {
            persistence::delete_cart_item(pool, item_id).await?;
        } else {
            persistence::update_cart_item_quantity(pool, item_id, request.quantity).await?;
        }
    }
    Ok(Json(build_cart_response(&products, &snapshot)))
}

/// DELETE /cart/items/{id}
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<CartResponse>, ApiError> {
    let products = state.products.read().await;
    let mut carts = state.carts.write().await;
    let items = carts
        .get_mut(&auth.user_id)
        .ok_or_else(|| ApiError::NotFound("Cart item not found".to_string()))?;
    let position = items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| ApiError::NotFound("Cart item not found".to_string()))?;
    items.remove(position);
    let snapshot = items.clone();
    drop(carts);

    if let Some(pool) = &state.db {
        persistence::delete_cart_item(pool, item_id).await?;
    }
    Ok(Json(build_cart_response(&products, &snapshot)))
}

/// DELETE /cart — drop every line.
pub async fn clear_cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    let mut carts = state.carts.write().await;
    carts.remove(&auth.user_id);
    drop(carts);

    if let Some(pool) = &state.db {
        let mut conn = pool.acquire().await?;
        persistence::clear_cart(&mut conn, auth.user_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
