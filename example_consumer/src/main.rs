//! Example consumer: a separate binary that mounts the storefront API under `/api/v1`
//! next to a route of its own.
//!
//! Run from repo root: `cargo run -p example-consumer`

use axum::{routing::get, Router};
use std::sync::Arc;
use storefront_api::{
    api_routes, apply_migrations, builtin_catalog, ensure_database_exists, resolve, AppState,
    PasswordHasher, PgGateway, Settings, TokenKeys,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storefront_api=info,tower_http=debug")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;

    let registry = resolve(&builtin_catalog()?, &settings.database_schema)?;
    apply_migrations(&pool, &registry).await?;
    let state = AppState::new(
        Arc::new(PgGateway::new(pool)),
        registry,
        PasswordHasher::new(settings.bcrypt_cost),
        TokenKeys::new(&settings.secret_key, &settings.refresh_key),
    );

    let app = Router::new()
        .route("/about", get(|| async { "storefront example consumer" }))
        .nest("/api/v1", api_routes(&state));
    let listener = TcpListener::bind(("127.0.0.1", settings.port)).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
