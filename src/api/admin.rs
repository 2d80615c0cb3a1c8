//! Admin endpoints: user management, global listings, platform stats.
//! Every handler requires the ADMIN role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::auth::{AuthUser, UserResponse};
use crate::api::error::ApiError;
use crate::api::orders::OrderResponse;
use crate::api::routes::AppState;
use crate::persistence;
use crate::types::product::Product;
use crate::types::user::UserStatus;

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    auth.require_admin()?;
    let guard = state.users.read().await;
    let mut users: Vec<UserResponse> = guard.values().map(UserResponse::from_user).collect();
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct SetUserStatusRequest {
    pub active: bool,
}

/// PUT /admin/users/{id}/status — INACTIVE accounts fail login.
pub async fn set_user_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SetUserStatusRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_admin()?;

    let status = if request.active {
        UserStatus::Active
    } else {
        UserStatus::Inactive
    };
    let mut guard = state.users.write().await;
    let user = guard
        .values_mut()
        .find(|u| u.id == user_id)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    user.status = status;
    let response = UserResponse::from_user(user);
    drop(guard);

    if let Some(pool) = &state.db {
        persistence::update_user_status(pool, user_id, status).await?;
    }
    Ok(Json(response))
}

/// GET /admin/orders — every order, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    auth.require_admin()?;
    let orders = crate::orders::list_all_orders(&state.orders).await;
    Ok(Json(orders.iter().map(OrderResponse::from_order).collect()))
}

/// GET /admin/products — every product regardless of status, newest first.
pub async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    auth.require_admin()?;
    let guard = state.products.read().await;
    let mut products: Vec<Product> = guard.values().cloned().collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(products))
}

/// DELETE /admin/products/{id} — any owner.
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    let mut guard = state.products.write().await;
    if guard.remove(&product_id).is_none() {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }
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
pub struct AdminDashboardStats {
    pub total_users: usize,
    pub total_products: usize,
    pub total_orders: usize,
    pub gross_revenue: Decimal,
}

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AdminDashboardStats>, ApiError> {
    auth.require_admin()?;

    let total_users = state.users.read().await.len();
    let total_products = state.products.read().await.len();
    let orders = state.orders.read().await;
    let total_orders = orders.len();
    let gross_revenue = orders.values().map(|o| o.total_amount).sum();

    Ok(Json(AdminDashboardStats {
        total_users,
        total_products,
        total_orders,
        gross_revenue,
    }))
}
