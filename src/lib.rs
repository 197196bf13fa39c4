//! Storefront API: configuration-driven REST backend for products, categories and users.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use auth::{PasswordHasher, TokenKeys, TokenPair};
pub use config::{builtin_catalog, resolve, ResolvedResource, ResourceRegistry};
pub use error::{AppError, ConfigError, RepositoryError};
pub use migration::apply_migrations;
pub use routes::{api_routes, app, HttpOptions};
pub use service::ResourceRepository;
pub use settings::Settings;
pub use state::{AppState, ResourceState};
pub use store::{connect, ensure_database_exists, Gateway, PgGateway};
