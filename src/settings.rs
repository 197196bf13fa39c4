//! Process settings read from the environment (after `.env` is loaded).

use crate::error::ConfigError;
use axum::http::HeaderValue;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    /// Schema holding the resource tables.
    pub database_schema: String,
    pub secret_key: String,
    pub refresh_key: String,
    pub port: u16,
    pub cors_origin: HeaderValue,
    pub body_limit_bytes: usize,
    pub bcrypt_cost: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let cors = lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3001".into());
        let cors_origin = HeaderValue::from_str(&cors).map_err(|_| ConfigError::InvalidEnv {
            name: "CORS_ORIGIN",
            value: cors.clone(),
        })?;
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/storefront".into()),
            database_max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            database_schema: lookup("DATABASE_SCHEMA").unwrap_or_else(|| "public".into()),
            secret_key: required(&lookup, "SECRET_KEY")?,
            refresh_key: required(&lookup, "REFRESH_KEY")?,
            port: parsed(&lookup, "PORT", 3000)?,
            cors_origin,
            body_limit_bytes: parsed(&lookup, "BODY_LIMIT_BYTES", 1024 * 1024)?,
            bcrypt_cost: parsed(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidEnv { name, value: v.clone() }),
    }
}
