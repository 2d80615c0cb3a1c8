//! Integration tests for the address book: defaults, label uniqueness,
//! ownership.

mod common;

use common::spawn_app;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn first_address_becomes_default() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;

    let res = app
        .client
        .post(format!("{}/addresses", app.base_url))
        .bearer_auth(&buyer)
        .json(&json!({
            "label": "home",
            "recipient_name": "Jo Buyer",
            "phone": "555-0100",
            "street1": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "country": "USA",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 201);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["is_default"].as_bool(), Some(true));
}

#[tokio::test]
async fn new_default_demotes_previous_default() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let first = app.create_address(&buyer, "home").await;

    let res = app
        .client
        .post(format!("{}/addresses", app.base_url))
        .bearer_auth(&buyer)
        .json(&json!({
            "label": "work",
            "recipient_name": "Jo Buyer",
            "phone": "555-0100",
            "street1": "9 Office Park",
            "city": "Springfield",
            "state": "IL",
            "country": "USA",
            "is_default": true,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);

    let fetched: Value = app
        .client
        .get(format!("{}/addresses/{}", app.base_url, first))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["is_default"].as_bool(), Some(false));
}

#[tokio::test]
async fn duplicate_label_returns_400() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let _ = app.create_address(&buyer, "home").await;

    let res = app
        .client
        .post(format!("{}/addresses", app.base_url))
        .bearer_auth(&buyer)
        .json(&json!({
            "label": "Home",
            "recipient_name": "Jo Buyer",
            "phone": "555-0100",
            "street1": "2 Other St",
            "city": "Springfield",
            "state": "IL",
            "country": "USA",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let json: Value = res.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("label"));
}

#[tokio::test]
async fn missing_required_field_returns_400() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;

    let res = app
        .client
        .post(format!("{}/addresses", app.base_url))
        .bearer_auth(&buyer)
        .json(&json!({
            "label": "home",
            "recipient_name": "Jo Buyer",
            "phone": "555-0100",
            "street1": "",
            "city": "Springfield",
            "state": "IL",
            "country": "USA",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn foreign_address_is_invisible() {
    let app = spawn_app().await;
    let (buyer_a, _) = app.register("a@example.com", "pw", None).await;
    let (buyer_b, _) = app.register("b@example.com", "pw", None).await;
    let address = app.create_address(&buyer_a, "home").await;

    let res = app
        .client
        .get(format!("{}/addresses/{}", app.base_url, address))
        .bearer_auth(&buyer_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);

    let res = app
        .client
        .delete(format!("{}/addresses/{}", app.base_url, address))
        .bearer_auth(&buyer_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn update_address_changes_fields() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let address = app.create_address(&buyer, "home").await;

    let res = app
        .client
        .put(format!("{}/addresses/{}", app.base_url, address))
        .bearer_auth(&buyer)
        .json(&json!({
            "label": "home",
            "recipient_name": "Jo B. Buyer",
            "phone": "555-0199",
            "street1": "42 New St",
            "city": "Shelbyville",
            "state": "IL",
            "country": "USA",
            "is_default": true,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["street1"].as_str(), Some("42 New St"));
    assert_eq!(json["city"].as_str(), Some("Shelbyville"));
}

#[tokio::test]
async fn deleting_default_promotes_oldest_remaining() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let first = app.create_address(&buyer, "home").await;
    let second = app.create_address(&buyer, "work").await;

    let res = app
        .client
        .delete(format!("{}/addresses/{}", app.base_url, first))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 204);

    let fetched: Value = app
        .client
        .get(format!("{}/addresses/{}", app.base_url, second))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["is_default"].as_bool(), Some(true));
}

#[tokio::test]
async fn get_unknown_address_returns_404() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;

    let res = app
        .client
        .get(format!("{}/addresses/{}", app.base_url, Uuid::new_v4()))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}
