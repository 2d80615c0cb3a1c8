pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod error;
pub mod orders;
pub mod products;
pub mod routes;
pub mod seller;
