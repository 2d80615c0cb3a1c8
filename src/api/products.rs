//! Public catalog endpoints: filtered listing, detail, categories.

use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::types::product::{Product, ProductStatus};

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

/// GET /products — ACTIVE products only, newest first.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Json<ProductPage> {
    let page = query.page.unwrap_or(0);
    let size = query
        .size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let search = query
        .search
        .as_deref()
        .map(str::to_lowercase)
        .filter(|s| !s.trim().is_empty());
    let category = query
        .category
        .as_deref()
        .map(str::to_lowercase)
        .filter(|s| !s.trim().is_empty());

    let guard = state.products.read().await;
    let mut matches: Vec<Product> = guard
        .values()
        .filter(|p| p.status == ProductStatus::Active)
        .filter(|p| {
            search.as_ref().is_none_or(|s| {
                p.name.to_lowercase().contains(s) || p.description.to_lowercase().contains(s)
            })
        })
        .filter(|p| {
            category.as_ref().is_none_or(|c| {
                p.category
                    .as_deref()
                    .is_some_and(|pc| pc.to_lowercase() == *c)
            })
        })
        .filter(|p| query.min_price.is_none_or(|min| p.price >= min))
        .filter(|p| query.max_price.is_none_or(|max| p.price <= max))
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = matches.len();
    let items = matches.into_iter().skip(page * size).take(size).collect();
    Json(ProductPage {
        items,
        page,
        size,
        total,
    })
}

/// GET /products/{id} — 404 unless the product exists and is ACTIVE.
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let guard = state.products.read().await;
    let product = guard
        .get(&product_id)
        .filter(|p| p.status == ProductStatus::Active)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
    Ok(Json(product.clone()))
}

/// GET /products/categories — distinct non-empty categories, sorted.
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    let guard = state.products.read().await;
    let mut categories: Vec<String> = guard
        .values()
        .filter_map(|p| p.category.clone())
        .filter(|c| !c.trim().is_empty())
        .collect();
    categories.sort();
    categories.dedup();
    Json(categories)
}
