#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde_json::{json, Value};
use sqlx::PgPool;
use storefront_api::{
    apply_migrations, app, builtin_catalog, connect, ensure_database_exists, resolve, AppState,
    HttpOptions, PasswordHasher, PgGateway, TokenKeys,
};
use tokio::net::TcpListener;

static NEXT_SCHEMA: AtomicUsize = AtomicUsize::new(0);

/// Server running in-process on a free port, with its tables in a schema of its own.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pool: PgPool,
    schema: String,
}

impl TestApp {
    /// None when TEST_DATABASE_URL is unset; callers return early.
    pub async fn spawn() -> Result<Option<Self>> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set; skipping");
            return Ok(None);
        };
        let schema = format!(
            "it_{}_{}",
            std::process::id(),
            NEXT_SCHEMA.fetch_add(1, Ordering::SeqCst)
        );

        ensure_database_exists(&database_url).await?;
        let pool = connect(&database_url, 2).await?;
        let registry = resolve(&builtin_catalog()?, &schema)?;
        apply_migrations(&pool, &registry).await?;

        let state = AppState::new(
            Arc::new(PgGateway::new(pool.clone())),
            registry,
            PasswordHasher::new(4),
            TokenKeys::new("it-access-secret", "it-refresh-secret"),
        );
        let router = app(
            &state,
            &HttpOptions {
                cors_origin: HeaderValue::from_static("http://localhost:3001"),
                body_limit_bytes: 1024 * 1024,
            },
        );

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Some(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            pool,
            schema,
        }))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sign up a fresh user and return an `authorization` header value.
    pub async fn bearer(&self) -> Result<String> {
        let email = format!("{}@example.test", self.schema);
        let creds = json!({ "email": email, "password": "secret" });
        let resp = self.client.post(self.url("/users")).json(&creds).send().await?;
        anyhow::ensure!(resp.status().is_success(), "signup failed: {}", resp.status());
        let body: Value = self
            .client
            .post(self.url("/users/login"))
            .json(&creds)
            .send()
            .await?
            .json()
            .await?;
        let token = body["accessToken"].as_str().context("no accessToken")?;
        Ok(format!("Bearer {}", token))
    }

    pub async fn create_category(&self, name: &str) -> Result<i64> {
        let body: Value = self
            .client
            .post(self.url("/categories"))
            .json(&json!({ "cat_name": name }))
            .send()
            .await?
            .json()
            .await?;
        body["id"].as_i64().context("category id missing")
    }

    /// Count rows directly, bypassing the active filter.
    pub async fn raw_count(&self, table: &str, id: i64) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM \"{}\".\"{}\" WHERE id = $1",
            self.schema, table
        );
        let (n,): (i64,) = sqlx::query_as(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(n)
    }

    pub async fn cleanup(self) -> Result<()> {
        sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", self.schema))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
