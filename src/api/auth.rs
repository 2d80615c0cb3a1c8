//! JWT issuance/validation, argon2 password hashing, the bearer-token
//! extractor, and the register/login endpoints.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::persistence;
use crate::types::user::{Role, User, UserStatus};

/// JWT claims: `sub` = user id (Uuid as string), `role`, `exp` (expiry),
/// `iat` (issued at).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

const JWT_EXPIRY_HOURS: i64 = 24;

impl Claims {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        let now = chrono::Utc::now();
        let exp = (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp();
        Self {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

pub fn create_token(
    secret: &[u8],
    user_id: Uuid,
    role: Role,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(user_id, role);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

pub fn decode_token(secret: &[u8], token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(token_data.claims)
}

/// Hash a password with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Authenticated caller extracted from the Bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Seller surface is open to sellers and admins.
    pub fn require_seller(&self) -> Result<(), ApiError> {
        match self.role {
            Role::Seller | Role::Admin => Ok(()),
            Role::Buyer => Err(ApiError::Forbidden("Seller role required".to_string())),
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin role required".to_string()))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
        let claims = decode_token(&state.jwt_secret, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;
        let role = Role::parse(&claims.role)
            .ok_or_else(|| ApiError::Unauthorized("Invalid token role".to_string()))?;
        Ok(AuthUser { user_id, role })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }
    if request.password.trim().is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }
    let role = match request.role {
        Some(Role::Admin) => {
            return Err(ApiError::BadRequest(
                "Cannot self-register as admin".to_string(),
            ));
        }
        Some(role) => role,
        None => Role::Buyer,
    };

    let mut users = state.users.write().await;
    if users.contains_key(&email) {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }
    let password_hash = hash_password(&request.password)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let user = User {
        id: Uuid::new_v4(),
        email: email.clone(),
        password_hash,
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        role,
        status: UserStatus::Active,
        created_at: Utc::now(),
    };
    if let Some(pool) = &state.db {
        persistence::insert_user(pool, &user).await?;
    }
    users.insert(email, user.clone());
    drop(users);

    let token = create_token(&state.jwt_secret, user.id, user.role)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }
    if request.password.trim().is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }

    let users = state.users.read().await;
    let user = users
        .get(&email)
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;
    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }
    if user.status == UserStatus::Inactive {
        return Err(ApiError::Unauthorized("Account is inactive".to_string()));
    }

    let token = create_token(&state.jwt_secret, user.id, user.role)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from_user(user),
    }))
}
