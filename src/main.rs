use ecom_api::api::routes::{app_router, AppState};
use ecom_api::persistence;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set, using an insecure development secret");
        "dev-secret-change-me".to_string()
    });

    let db = match std::env::var("DATABASE_URL") {
        Ok(url) => Some(
            persistence::create_pool_and_migrate(&url)
                .await
                .expect("failed to connect to DATABASE_URL"),
        ),
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, running with in-memory state only");
            None
        }
    };

    let state = AppState::new(jwt_secret.into_bytes(), db.clone());
    if let Some(pool) = &db {
        state.hydrate(pool).await.expect("failed to hydrate state");
    }

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await.unwrap();
}
