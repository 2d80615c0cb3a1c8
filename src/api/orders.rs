//! Order endpoints: placement, retrieval, and status transitions. The heavy
//! lifting lives in `crate::orders`; handlers translate between HTTP and the
//! workflow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::orders::LineItemSource;
use crate::types::order::{Order, OrderStatus};

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Placement body. Without `items` the buyer's cart is the line-item source
/// and is cleared on success. Client-sent prices or totals are never
/// accepted; pricing is always server-side.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub shipping_address_id: Uuid,
    #[serde(default)]
    pub items: Option<Vec<OrderItemRequest>>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
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
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id,
            buyer_id: order.buyer_id,
            status: order.status,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address.clone(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    seller_id: item.seller_id,
                    product_name: item.product_name.clone(),
                    product_image_url: item.product_image_url.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    subtotal: item.subtotal(),
                })
                .collect(),
            created_at: order.created_at,
        }
    }
}

/// POST /orders
pub async fn place_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let source = match request.items {
        Some(items) => LineItemSource::Items(
            items
                .into_iter()
                .map(|item| (item.product_id, item.quantity))
                .collect(),
        ),
        None => LineItemSource::Cart,
    };
    let order = crate::orders::place_order(
        &state.products,
        &state.carts,
        &state.orders,
        &state.addresses,
        state.db.as_ref(),
        auth.user_id,
        request.shipping_address_id,
        source,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from_order(&order))))
}

/// GET /orders/mine
pub async fn my_orders(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<OrderResponse>> {
    let orders = crate::orders::list_orders_for_buyer(&state.orders, auth.user_id).await;
    Json(orders.iter().map(OrderResponse::from_order).collect())
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order =
        crate::orders::get_order(&state.orders, order_id, auth.user_id, auth.is_admin()).await?;
    Ok(Json(OrderResponse::from_order(&order)))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: OrderStatus,
}

/// PATCH /orders/{id}/status?status=ENUM — seller/admin operation.
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<OrderResponse>, ApiError> {
    auth.require_seller()?;
    let order =
        crate::orders::update_status(&state.orders, state.db.as_ref(), order_id, query.status)
            .await?;
    Ok(Json(OrderResponse::from_order(&order)))
}
