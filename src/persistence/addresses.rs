//! Address persistence: CRUD and hydration.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::address::Address;

#[derive(Debug, FromRow)]
pub struct AddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub recipient_name: String,
    pub phone: String,
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

pub fn address_row_to_address(row: &AddressRow) -> Address {
    Address {
        id: row.id,
        user_id: row.user_id,
        label: row.label.clone(),
        recipient_name: row.recipient_name.clone(),
        phone: row.phone.clone(),
        street1: row.street1.clone(),
        street2: row.street2.clone(),
        city: row.city.clone(),
        state: row.state.clone(),
        postal_code: row.postal_code.clone(),
        country: row.country.clone(),
        is_default: row.is_default,
        created_at: row.created_at,
    }
}

/// List all addresses for hydration.
pub async fn list_addresses(pool: &PgPool) -> Result<Vec<AddressRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AddressRow>(
        "SELECT id, user_id, label, recipient_name, phone, street1, street2, city, state, postal_code, country, is_default, created_at \
         FROM addresses",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert_address(pool: &PgPool, address: &Address) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO addresses (id, user_id, label, recipient_name, phone, street1, street2, city, state, postal_code, country, is_default, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(address.id)
    .bind(address.user_id)
    .bind(&address.label)
    .bind(&address.recipient_name)
    .bind(&address.phone)
    .bind(&address.street1)
    .bind(&address.street2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.country)
    .bind(address.is_default)
    .bind(address.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_address(pool: &PgPool, address: &Address) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE addresses SET label = $1, recipient_name = $2, phone = $3, street1 = $4, street2 = $5, \
         city = $6, state = $7, postal_code = $8, country = $9, is_default = $10 WHERE id = $11",
    )
    .bind(&address.label)
    .bind(&address.recipient_name)
    .bind(&address.phone)
    .bind(&address.street1)
    .bind(&address.street2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.country)
    .bind(address.is_default)
    .bind(address.id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_address(pool: &PgPool, address_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM addresses WHERE id = $1")
        .bind(address_id)
        .execute(pool)
        .await?;
    Ok(())
}
