//! Address book endpoints. One default address per user; the first address
//! becomes default automatically.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::persistence;
use crate::types::address::Address;

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub label: String,
    pub recipient_name: String,
    pub phone: String,
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

fn validate(request: &AddressRequest) -> Result<(), ApiError> {
    for (value, field) in [
        (&request.label, "label"),
        (&request.recipient_name, "recipient_name"),
        (&request.street1, "street1"),
        (&request.city, "city"),
        (&request.country, "country"),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("{field} is required")));
        }
    }
    Ok(())
}

/// POST /addresses
pub async fn create_address(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    validate(&request)?;

    let mut guard = state.addresses.write().await;
    if guard
        .values()
        .any(|a| a.user_id == auth.user_id && a.label.eq_ignore_ascii_case(&request.label))
    {
        return Err(ApiError::BadRequest(format!(
            "You already have an address with the label: {}",
            request.label
        )));
    }

    let is_first = !guard.values().any(|a| a.user_id == auth.user_id);
    let make_default = request.is_default || is_first;
    if make_default {
        for previous in guard
            .values_mut()
            .filter(|a| a.user_id == auth.user_id && a.is_default)
        {
            previous.is_default = false;
            if let Some(pool) = &state.db {
                persistence::update_address(pool, previous).await?;
            }
        }
    }

    let address = Address {
        id: Uuid::new_v4(),
        user_id: auth.user_id,
        label: request.label.trim().to_string(),
        recipient_name: request.recipient_name.trim().to_string(),
        phone: request.phone.trim().to_string(),
        street1: request.street1.trim().to_string(),
        street2: request.street2.clone(),
        city: request.city.trim().to_string(),
        state: request.state.trim().to_string(),
        postal_code: request.postal_code.clone(),
        country: request.country.trim().to_string(),
        is_default: make_default,
        created_at: Utc::now(),
    };
    if let Some(pool) = &state.db {
        persistence::insert_address(pool, &address).await?;
    }
    guard.insert(address.id, address.clone());
    Ok((StatusCode::CREATED, Json(address)))
}

/// GET /addresses — caller's addresses, oldest first.
pub async fn list_addresses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<Vec<Address>> {
    let guard = state.addresses.read().await;
    let mut addresses: Vec<Address> = guard
        .values()
        .filter(|a| a.user_id == auth.user_id)
        .cloned()
        .collect();
    addresses.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Json(addresses)
}

/// GET /addresses/{id}
pub async fn get_address(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(address_id): Path<Uuid>,
) -> Result<Json<Address>, ApiError> {
    let guard = state.addresses.read().await;
    let address = guard
        .get(&address_id)
        .filter(|a| a.user_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound("Address not found".to_string()))?;
    Ok(Json(address.clone()))
}

/// PUT /addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(address_id): Path<Uuid>,
    Json(request): Json<AddressRequest>,
) -> Result<Json<Address>, ApiError> {
    validate(&request)?;

    let mut guard = state.addresses.write().await;
    if !guard
        .get(&address_id)
        .is_some_and(|a| a.user_id == auth.user_id)
    {
        return Err(ApiError::NotFound("Address not found".to_string()));
    }
    if guard.values().any(|a| {
        a.id != address_id
            && a.user_id == auth.user_id
            && a.label.eq_ignore_ascii_case(&request.label)
    }) {
        return Err(ApiError::BadRequest(format!(
            "You already have an address with the label: {}",
            request.label
        )));
    }

    if request.is_default {
        for previous in guard
            .values_mut()
            .filter(|a| a.id != address_id && a.user_id == auth.user_id && a.is_default)
        {
            previous.is_default = false;
            if let Some(pool) = &state.db {
                persistence::update_address(pool, previous).await?;
            }
        }
    }

    let address = guard
        .get_mut(&address_id)
        .ok_or_else(|| ApiError::NotFound("Address not found".to_string()))?;
    address.label = request.label.trim().to_string();
    address.recipient_name = request.recipient_name.trim().to_string();
    address.phone = request.phone.trim().to_string();
    address.street1 = request.street1.trim().to_string();
    address.street2 = request.street2.clone();
    address.city = request.city.trim().to_string();
    address.state = request.state.trim().to_string();
    address.postal_code = request.postal_code.clone();
    address.country = request.country.trim().to_string();
    address.is_default = request.is_default;
    let updated = address.clone();
    if let Some(pool) = &state.db {
        persistence::update_address(pool, &updated).await?;
    }
    Ok(Json(updated))
}

/// DELETE /addresses/{id} — deleting the default promotes the oldest
/// remaining address, if any.
pub async fn delete_address(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(address_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut guard = state.addresses.write().await;
    if !guard
        .get(&address_id)
        .is_some_and(|a| a.user_id == auth.user_id)
    {
        return Err(ApiError::NotFound("Address not found".to_string()));
    }
    let Some(removed) = guard.remove(&address_id) else {
        return Err(ApiError::NotFound("Address not found".to_string()));
    };
    if let Some(pool) = &state.db {
        persistence::delete_address(pool, removed.id).await?;
    }

    if removed.is_default {
        let next_default = guard
            .values_mut()
            .filter(|a| a.user_id == auth.user_id)
            .min_by_key(|a| a.created_at);
        if let Some(next) = next_default {
            next.is_default = true;
            if let Some(pool) = &state.db {
                persistence::update_address(pool, next).await?;
            }
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
