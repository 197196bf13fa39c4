//! Data gateway: executes built queries and turns rows into JSON.

use crate::error::ConfigError;
use crate::sql::QueryBuf;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::ConnectOptions;
use std::str::FromStr;

/// Abstraction over the SQL store so the service layer can run against a fake in tests.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Run a row-returning statement.
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, sqlx::Error>;

    /// Run a statement for its affected-row count. For UPDATE this is the number of rows
    /// matched by the WHERE clause, even when no value changed.
    async fn execute(&self, q: &QueryBuf) -> Result<u64, sqlx::Error>;

    async fn ping(&self) -> Result<(), sqlx::Error>;
}

#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn bind_all<'q>(
    q: &'q QueryBuf,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

#[async_trait]
impl Gateway for PgGateway {
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let done = bind_all(q).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}

/// Open the connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    let Some((admin_url, db_name)) = split_db_name(database_url) else {
        return Ok(());
    };
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)?;
    let mut conn = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", crate::sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// `postgres://u:p@h:5432/shop?sslmode=disable` -> (`postgres://u:p@h:5432/postgres?sslmode=disable`, `shop`).
fn split_db_name(url: &str) -> Option<(String, String)> {
    let scheme_end = url.find("://")? + 3;
    let slash = scheme_end + url.get(scheme_end..)?.find('/')?;
    let rest = url.get(slash + 1..)?;
    let (db, query) = match rest.split_once('?') {
        Some((db, q)) => (db, Some(q)),
        None => (rest, None),
    };
    let base = url.get(..=slash)?;
    let admin = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Some((admin, db.trim().to_string()))
}

/// Validate a schema name before it is interpolated into DDL.
pub fn check_identifier(name: &str) -> Result<(), ConfigError> {
    let ok = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("invalid identifier '{}'", name)))
    }
}
