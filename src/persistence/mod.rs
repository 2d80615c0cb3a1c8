//! Database layer: pool, migrations, and access for users, products,
//! addresses, carts, and orders. The database is optional at runtime; when
//! configured, in-memory stores are hydrated from it at startup and every
//! mutation is written through.

mod addresses;
mod carts;
mod orders;
mod pool;
mod products;
mod users;

pub use addresses::{
    address_row_to_address, delete_address, insert_address, list_addresses, update_address,
    AddressRow,
};
pub use carts::{
    cart_item_row_to_item, clear_cart, delete_cart_item, delete_cart_items_for_product,
    list_cart_items, update_cart_item_quantity, upsert_cart_item, CartItemRow,
};
pub use orders::{
    insert_order, list_order_items, list_orders, rows_to_orders, update_order_status, OrderItemRow,
    OrderRow,
};
pub use pool::{create_pool_and_migrate, run_migrations};
pub use products::{
    decrement_stock, delete_product, insert_product, list_products, product_row_to_product,
    update_product, ProductRow,
};
pub use sqlx::PgPool;
pub use users::{insert_user, list_users, update_user_status, user_row_to_user, UserRow};
