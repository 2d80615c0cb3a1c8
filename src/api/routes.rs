//! Router assembly and shared application state.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{addresses, admin, auth, cart, orders, products, seller};
use crate::orders::{SharedAddresses, SharedCarts, SharedOrders, SharedProducts};
use crate::persistence;
use crate::types::user::User;

/// Registered accounts keyed by lowercase email.
pub type UserStore = Arc<RwLock<HashMap<String, User>>>;

/// Shared application state. All stores are authoritative at request time;
/// the pool, when present, is hydrated from at startup and written through
/// on every mutation.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub products: SharedProducts,
    pub addresses: SharedAddresses,
    pub carts: SharedCarts,
    pub orders: SharedOrders,
    pub jwt_secret: Vec<u8>,
    pub db: Option<PgPool>,
}

impl AppState {
    /// Fresh empty state.
    pub fn new(jwt_secret: Vec<u8>, db: Option<PgPool>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            products: Arc::new(RwLock::new(HashMap::new())),
            addresses: Arc::new(RwLock::new(HashMap::new())),
            carts: Arc::new(RwLock::new(HashMap::new())),
            orders: Arc::new(RwLock::new(HashMap::new())),
            jwt_secret,
            db,
        }
    }

    /// Load every store from the database (startup, after migrations).
    pub async fn hydrate(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        let user_rows = persistence::list_users(pool).await?;
        {
            let mut users = self.users.write().await;
            for row in &user_rows {
                if let Some(user) = persistence::user_row_to_user(row) {
                    users.insert(user.email.clone(), user);
                }
            }
        }

        let product_rows = persistence::list_products(pool).await?;
        {
            let mut products = self.products.write().await;
            for row in &product_rows {
                if let Some(product) = persistence::product_row_to_product(row) {
                    products.insert(product.id, product);
                }
            }
        }

        let address_rows = persistence::list_addresses(pool).await?;
        {
            let mut addresses = self.addresses.write().await;
            for row in &address_rows {
                let address = persistence::address_row_to_address(row);
                addresses.insert(address.id, address);
            }
        }

        let cart_rows = persistence::list_cart_items(pool).await?;
        {
            let mut carts = self.carts.write().await;
            for row in &cart_rows {
                if let Some(item) = persistence::cart_item_row_to_item(row) {
                    carts.entry(row.buyer_id).or_default().push(item);
                }
            }
        }

        let order_rows = persistence::list_orders(pool).await?;
        let item_rows = persistence::list_order_items(pool).await?;
        *self.orders.write().await = persistence::rows_to_orders(&order_rows, &item_rows);

        tracing::info!(
            users = user_rows.len(),
            products = product_rows.len(),
            orders = order_rows.len(),
            "state hydrated from database"
        );
        Ok(())
    }
}

async fn health() -> &'static str {
    "healthy"
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/products", get(products::list_products))
        .route("/products/categories", get(products::list_categories))
        .route("/products/{id}", get(products::get_product))
        .route(
            "/addresses",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/addresses/{id}",
            get(addresses::get_address)
                .put(addresses::update_address)
                .delete(addresses::delete_address),
        )
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/{id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/orders", post(orders::place_order))
        .route("/orders/mine", get(orders::my_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/status", patch(orders::update_status))
        .route("/seller/dashboard", get(seller::dashboard))
        .route(
            "/seller/products",
            get(seller::list_products).post(seller::create_product),
        )
        .route(
            "/seller/products/{id}",
            put(seller::update_product).delete(seller::delete_product),
        )
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/status", put(admin::set_user_status))
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/products", get(admin::list_products))
        .route("/admin/products/{id}", delete(admin::delete_product))
        .with_state(state)
}
