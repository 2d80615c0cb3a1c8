//! Integration tests for the cart: add, merge, update, remove, clear.

mod common;

use common::spawn_app;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn empty_cart_reads_as_empty() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;

    let res = app
        .client
        .get(format!("{}/cart", app.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let json: Value = res.json().await.unwrap();
    assert!(json["items"].as_array().unwrap().is_empty());
    assert_eq!(json["total"].as_str(), Some("0"));
}

#[tokio::test]
async fn add_item_shows_product_details_and_subtotal() {
    let app = spawn_app().await;
    let (seller, _) = app.register("seller@example.com", "pw", Some("SELLER")).await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let widget = app.create_product(&seller, "Widget", "4.25", 10).await;

    let res = app
        .client
        .post(format!("{}/cart/items", app.base_url))
        .bearer_auth(&buyer)
        .json(&json!({ "product_id": widget, "quantity": 2 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 201);
    let json: Value = res.json().await.unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_name"].as_str(), Some("Widget"));
    assert_eq!(items[0]["quantity"].as_u64(), Some(2));
    assert_eq!(items[0]["subtotal"].as_str(), Some("8.50"));
    assert_eq!(json["total"].as_str(), Some("8.50"));
}

#[tokio::test]
async fn adding_same_product_twice_merges_quantities() {
    let app = spawn_app().await;
    let (seller, _) = app.register("seller@example.com", "pw", Some("SELLER")).await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let widget = app.create_product(&seller, "Widget", "1.00", 10).await;

    app.add_to_cart(&buyer, widget, 2).await;
    app.add_to_cart(&buyer, widget, 3).await;

    let cart: Value = app
        .client
        .get(format!("{}/cart", app.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"].as_u64(), Some(5));
}

#[tokio::test]
async fn add_unknown_product_returns_404() {
    let app = spawn_app().await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;

    let res = app
        .client
        .post(format!("{}/cart/items", app.base_url))
        .bearer_auth(&buyer)
        .json(&json!({ "product_id": Uuid::new_v4(), "quantity": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn add_with_zero_quantity_returns_400() {
    let app = spawn_app().await;
    let (seller, _) = app.register("seller@example.com", "pw", Some("SELLER")).await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let widget = app.create_product(&seller, "Widget", "1.00", 10).await;

    let res = app
        .client
        .post(format!("{}/cart/items", app.base_url))
        .bearer_auth(&buyer)
        .json(&json!({ "product_id": widget, "quantity": 0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn update_item_quantity_and_remove_via_zero() {
    let app = spawn_app().await;
    let (seller, _) = app.register("seller@example.com", "pw", Some("SELLER")).await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let widget = app.create_product(&seller, "Widget", "1.00", 10).await;
    app.add_to_cart(&buyer, widget, 1).await;

    let cart: Value = app
        .client
        .get(format!("{}/cart", app.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let item_id = cart["items"][0]["id"].as_str().unwrap().to_string();

    let res = app
        .client
        .patch(format!("{}/cart/items/{}", app.base_url, item_id))
        .bearer_auth(&buyer)
        .json(&json!({ "quantity": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["items"][0]["quantity"].as_u64(), Some(7));

    let res = app
        .client
        .patch(format!("{}/cart/items/{}", app.base_url, item_id))
        .bearer_auth(&buyer)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let json: Value = res.json().await.unwrap();
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cannot_touch_another_buyers_cart_item() {
    let app = spawn_app().await;
    let (seller, _) = app.register("seller@example.com", "pw", Some("SELLER")).await;
    let (buyer_a, _) = app.register("a@example.com", "pw", None).await;
    let (buyer_b, _) = app.register("b@example.com", "pw", None).await;
    let widget = app.create_product(&seller, "Widget", "1.00", 10).await;
    app.add_to_cart(&buyer_a, widget, 1).await;

    let cart: Value = app
        .client
        .get(format!("{}/cart", app.base_url))
        .bearer_auth(&buyer_a)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let item_id = cart["items"][0]["id"].as_str().unwrap().to_string();

    let res = app
        .client
        .delete(format!("{}/cart/items/{}", app.base_url, item_id))
        .bearer_auth(&buyer_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn remove_item_and_clear_cart() {
    let app = spawn_app().await;
    let (seller, _) = app.register("seller@example.com", "pw", Some("SELLER")).await;
    let (buyer, _) = app.register("buyer@example.com", "pw", None).await;
    let widget = app.create_product(&seller, "Widget", "1.00", 10).await;
    let gadget = app.create_product(&seller, "Gadget", "2.00", 10).await;
    app.add_to_cart(&buyer, widget, 1).await;
    app.add_to_cart(&buyer, gadget, 1).await;

    let cart: Value = app
        .client
        .get(format!("{}/cart", app.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let item_id = cart["items"][0]["id"].as_str().unwrap().to_string();

    let res = app
        .client
        .delete(format!("{}/cart/items/{}", app.base_url, item_id))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 1);

    let res = app
        .client
        .delete(format!("{}/cart", app.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 204);

    let cart: Value = app
        .client
        .get(format!("{}/cart", app.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cart["items"].as_array().unwrap().is_empty());
}
