//! Order placement workflow, retrieval, and status transitions.
//! Testable without HTTP.
//!
//! Placement is the one operation that must be atomic: every stock check and
//! decrement, the order insert, and the cart clear succeed together or not at
//! all. In-process serialization comes from holding the product store write
//! lock across the whole sequence; when a database is configured the same
//! steps run in one transaction with a conditional decrement, committed
//! before the in-memory stores are touched.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::persistence;
use crate::types::address::Address;
use crate::types::cart::CartItem;
use crate::types::order::{Order, OrderItem, OrderStatus};
use crate::types::product::{Product, ProductStatus};

pub type SharedProducts = Arc<RwLock<HashMap<Uuid, Product>>>;
pub type SharedAddresses = Arc<RwLock<HashMap<Uuid, Address>>>;
pub type SharedOrders = Arc<RwLock<HashMap<Uuid, Order>>>;
/// Carts keyed by buyer id; a missing entry is an empty cart.
pub type SharedCarts = Arc<RwLock<HashMap<Uuid, Vec<CartItem>>>>;

/// Monetary scale used for totals.
const MONEY_SCALE: u32 = 2;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Address not found")]
    AddressNotFound,
    #[error("Cannot place order with empty cart")]
    EmptyCart,
    #[error("Cannot place order with no items")]
    NoItems,
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(Uuid),
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),
    #[error("Insufficient stock for product: {name} ({available} available)")]
    InsufficientStock { name: String, available: i64 },
    #[error("Order not found")]
    NotFound,
    #[error("You do not own this order")]
    Forbidden,
    #[error("Cannot transition order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Where an order's lines come from: the buyer's cart (cleared on success) or
/// explicit product/quantity pairs from the request. Either way pricing is
/// read from the live catalog, never from the client.
#[derive(Debug, Clone)]
pub enum LineItemSource {
    Cart,
    Items(Vec<(Uuid, u32)>),
}

/// Place an order for `buyer_id` shipping to one of their addresses.
///
/// Returns the materialized order snapshot. On any error no stock counter,
/// cart line, or order row is changed, in memory or in the database.
#[allow(clippy::too_many_arguments)]
pub async fn place_order(
    products: &SharedProducts,
    carts: &SharedCarts,
    orders: &SharedOrders,
    addresses: &SharedAddresses,
    db: Option<&PgPool>,
    buyer_id: Uuid,
    shipping_address_id: Uuid,
    source: LineItemSource,
) -> Result<Order, OrderError> {
    // Snapshot the shipping address up front; ownership is part of the
    // lookup, so a foreign address is indistinguishable from a missing one.
    let shipping_address = {
        let guard = addresses.read().await;
        guard
            .get(&shipping_address_id)
            .filter(|a| a.user_id == buyer_id)
            .ok_or(OrderError::AddressNotFound)?
            .snapshot()
    };

    // Guards are always taken in this order (products, carts, orders).
    // The product write lock is held across check + decrement, so two
    // placements against the same product serialize.
    let mut products_guard = products.write().await;
    let mut carts_guard = carts.write().await;
    let mut orders_guard = orders.write().await;

    let from_cart = matches!(source, LineItemSource::Cart);
    let requested: Vec<(Uuid, u32)> = match source {
        LineItemSource::Cart => carts_guard
            .get(&buyer_id)
            .filter(|items| !items.is_empty())
            .ok_or(OrderError::EmptyCart)?
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect(),
        LineItemSource::Items(pairs) => {
            if pairs.is_empty() {
                return Err(OrderError::NoItems);
            }
            pairs
        }
    };

    // Merge duplicate product references so stock is checked against the
    // combined quantity, keeping first-seen order.
    let mut merged: Vec<(Uuid, u32)> = Vec::new();
    for (product_id, quantity) in requested {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(product_id));
        }
        match merged.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, q)) => *q += quantity,
            None => merged.push((product_id, quantity)),
        }
    }

    // Validate the whole batch before touching any counter; a failure here
    // leaves every product exactly as it was.
    let mut items = Vec::with_capacity(merged.len());
    let mut total = Decimal::ZERO;
    for (product_id, quantity) in &merged {
        let product = products_guard
            .get(product_id)
            .ok_or(OrderError::ProductNotFound(*product_id))?;
        if product.stock_quantity < i64::from(*quantity) {
            return Err(OrderError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock_quantity,
            });
        }
        items.push(OrderItem {
            id: Uuid::new_v4(),
            product_id: *product_id,
            seller_id: product.seller_id,
            product_name: product.name.clone(),
            product_image_url: product.image_url.clone(),
            quantity: *quantity,
            unit_price: product.price,
        });
        total += product.price * Decimal::from(*quantity);
    }
    let total = total.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);

    let order = Order {
        id: Uuid::new_v4(),
        buyer_id,
        status: OrderStatus::Pending,
        total_amount: total,
        shipping_address,
        items,
        created_at: Utc::now(),
    };

    // Write-through commits before the in-memory stores change; a database
    // failure aborts the attempt with no visible effect anywhere.
    if let Some(pool) = db {
        let mut tx = pool.begin().await?;
        for (product_id, quantity) in &merged {
            let decremented =
                persistence::decrement_stock(&mut *tx, *product_id, i64::from(*quantity)).await?;
            if !decremented {
                tx.rollback().await?;
                let product = products_guard
                    .get(product_id)
                    .ok_or(OrderError::ProductNotFound(*product_id))?;
                return Err(OrderError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock_quantity,
                });
            }
        }
        persistence::insert_order(&mut *tx, &order).await?;
        if from_cart {
            persistence::clear_cart(&mut *tx, buyer_id).await?;
        }
        tx.commit().await?;
    }

    for (product_id, quantity) in &merged {
        if let Some(product) = products_guard.get_mut(product_id) {
            product.stock_quantity -= i64::from(*quantity);
            if product.stock_quantity == 0 {
                product.status = ProductStatus::OutOfStock;
            }
            product.updated_at = order.created_at;
        }
    }
    if from_cart {
        carts_guard.remove(&buyer_id);
    }
    orders_guard.insert(order.id, order.clone());

    tracing::info!(
        order_id = %order.id,
        buyer_id = %buyer_id,
        total = %order.total_amount,
        items = order.items.len(),
        "order placed"
    );
    Ok(order)
}

/// Fetch one order. Buyers only see their own; admins see any.
pub async fn get_order(
    orders: &SharedOrders,
    order_id: Uuid,
    requester: Uuid,
    admin: bool,
) -> Result<Order, OrderError> {
    let guard = orders.read().await;
    let order = guard.get(&order_id).ok_or(OrderError::NotFound)?;
    if !admin && order.buyer_id != requester {
        return Err(OrderError::Forbidden);
    }
    Ok(order.clone())
}

/// All orders owned by `buyer_id`, newest first.
pub async fn list_orders_for_buyer(orders: &SharedOrders, buyer_id: Uuid) -> Vec<Order> {
    let guard = orders.read().await;
    let mut result: Vec<Order> = guard
        .values()
        .filter(|o| o.buyer_id == buyer_id)
        .cloned()
        .collect();
    result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    result
}

/// Every order in the system, newest first (admin listing).
pub async fn list_all_orders(orders: &SharedOrders) -> Vec<Order> {
    let guard = orders.read().await;
    let mut result: Vec<Order> = guard.values().cloned().collect();
    result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    result
}

/// Move an order along its lifecycle. Transitions outside
/// `OrderStatus::can_transition_to` are rejected.
pub async fn update_status(
    orders: &SharedOrders,
    db: Option<&PgPool>,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<Order, OrderError> {
    let mut guard = orders.write().await;
    let order = guard.get_mut(&order_id).ok_or(OrderError::NotFound)?;
    if !order.status.can_transition_to(status) {
        return Err(OrderError::IllegalTransition {
            from: order.status,
            to: status,
        });
    }
    if let Some(pool) = db {
        persistence::update_order_status(pool, order_id, status).await?;
    }
    order.status = status;
    Ok(order.clone())
}
