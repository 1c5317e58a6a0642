//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.
//!
//! With `DATABASE_URL` set the user store is PostgreSQL; without it the
//! server falls back to an in-memory store seeded with the default
//! brewery accounts, which is the development mode.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use auth::{
    AuthConfig, InMemoryUserStore, PgUserStore, brewery_access_policy, brewery_router,
    seed_default_users,
};
use axum::http::{HeaderName, Method, header};
use platform::password::standard_password_encoder;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let encoder = Arc::new(standard_password_encoder());
    let config = AuthConfig::default();
    let policy = brewery_access_policy();

    let app = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            tracing::info!("Connected to database");

            brewery_router(Arc::new(PgUserStore::new(pool)), encoder, &config, policy)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using seeded in-memory user store");
            let store = InMemoryUserStore::new();
            seed_default_users(&store, &encoder)?;

            brewery_router(Arc::new(store), encoder, &config, policy)
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<axum::http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("api-key"),
            HeaderName::from_static("api-secret"),
        ]))
        .allow_credentials(true);

    let app = app.layer(TraceLayer::new_for_http()).layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
