//! Shared test harness: spawn the app on a random port with in-memory state
//! (no database) and drive it over HTTP.

#![allow(dead_code)]

use ecom_api::api::routes::{app_router, AppState};
use serde_json::{json, Value};
use uuid::Uuid;

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
}

/// Spawn the app on a random port and return a harness that keeps it running.
pub async fn spawn_app() -> TestApp {
    let state = AppState::new(b"test-jwt-secret".to_vec(), None);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        state,
    }
}

impl TestApp {
    /// Register a user and return their bearer token and id.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> (String, Uuid) {
        let mut body = json!({ "email": email, "password": password });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        let res = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 201, "register failed");
        let json: Value = res.json().await.unwrap();
        let token = json["token"].as_str().unwrap().to_string();
        let user_id = Uuid::parse_str(json["user"]["id"].as_str().unwrap()).unwrap();
        (token, user_id)
    }

    /// Create a product through the seller API and return its id.
    pub async fn create_product(
        &self,
        seller_token: &str,
        name: &str,
        price: &str,
        stock: i64,
    ) -> Uuid {
        let res = self
            .client
            .post(format!("{}/seller/products", self.base_url))
            .bearer_auth(seller_token)
            .json(&json!({ "name": name, "price": price, "stock_quantity": stock }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 201, "create product failed");
        let json: Value = res.json().await.unwrap();
        Uuid::parse_str(json["id"].as_str().unwrap()).unwrap()
    }

    /// Create an address for the caller and return its id.
    pub async fn create_address(&self, token: &str, label: &str) -> Uuid {
        let res = self
            .client
            .post(format!("{}/addresses", self.base_url))
            .bearer_auth(token)
            .json(&json!({
                "label": label,
                "recipient_name": "Jo Buyer",
                "phone": "555-0100",
                "street1": "1 Main St",
                "city": "Springfield",
                "state": "IL",
                "postal_code": "62701",
                "country": "USA",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 201, "create address failed");
        let json: Value = res.json().await.unwrap();
        Uuid::parse_str(json["id"].as_str().unwrap()).unwrap()
    }

    /// Add a product to the caller's cart.
    pub async fn add_to_cart(&self, token: &str, product_id: Uuid, quantity: u32) {
        let res = self
            .client
            .post(format!("{}/cart/items", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "product_id": product_id, "quantity": quantity }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 201, "add to cart failed");
    }

    /// Place a cart-based order; returns the raw response for the test to
    /// assert on.
    pub async fn place_order_from_cart(&self, token: &str, address_id: Uuid) -> reqwest::Response {
        self.client
            .post(format!("{}/orders", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "shipping_address_id": address_id }))
            .send()
            .await
            .unwrap()
    }

    /// Seed an admin account directly into the store (admins cannot
    /// self-register) and return their bearer token and id.
    pub async fn seed_admin(&self, email: &str, password: &str) -> (String, Uuid) {
        use ecom_api::types::user::{Role, User, UserStatus};

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: ecom_api::api::auth::hash_password(password).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Admin,
            status: UserStatus::Active,
            created_at: chrono::Utc::now(),
        };
        let user_id = user.id;
        self.state
            .users
            .write()
            .await
            .insert(email.to_string(), user);

        let res = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 200, "admin login failed");
        let json: Value = res.json().await.unwrap();
        (json["token"].as_str().unwrap().to_string(), user_id)
    }

    /// Current stock counter for a product, read from the shared store.
    pub async fn stock_of(&self, product_id: Uuid) -> i64 {
        let guard = self.state.products.read().await;
        guard.get(&product_id).expect("product exists").stock_quantity
    }
}
