//! Storefront server: settings from env, database bootstrap, resource routes.

use std::sync::Arc;
use storefront_api::{
    apply_migrations, app, builtin_catalog, connect, ensure_database_exists, resolve, AppState,
    HttpOptions, PasswordHasher, PgGateway, Settings, TokenKeys,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront_api=info,storefront=info,tower_http=debug")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = connect(&settings.database_url, settings.database_max_connections).await?;

    let registry = resolve(&builtin_catalog()?, &settings.database_schema)?;
    apply_migrations(&pool, &registry).await?;

    let state = AppState::new(
        Arc::new(PgGateway::new(pool.clone())),
        registry,
        PasswordHasher::new(settings.bcrypt_cost),
        TokenKeys::new(&settings.secret_key, &settings.refresh_key),
    );
    let router = app(&state, &HttpOptions::from(&settings));

    let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
    tracing::info!("shutdown requested");
}
