//! User persistence: insert, list for hydration, status updates.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::user::{Role, User, UserStatus};

/// Row returned from DB (email is stored lowercase).
#[derive(FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Convert a row to a User. Skips rows with unknown role/status strings.
pub fn user_row_to_user(row: &UserRow) -> Option<User> {
    Some(User {
        id: row.id,
        email: row.email.clone(),
        password_hash: row.password_hash.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        role: Role::parse(&row.role)?,
        status: UserStatus::parse(&row.status)?,
        created_at: row.created_at,
    })
}

/// List all users for hydration.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, first_name, last_name, role, status, created_at \
         FROM users",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert a user. Email must already be lowercase.
pub async fn insert_user(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, role, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.as_str())
    .bind(user.status.as_str())
    .bind(user.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Update account status (admin activate/deactivate).
pub async fn update_user_status(
    pool: &PgPool,
    user_id: Uuid,
    status: UserStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
