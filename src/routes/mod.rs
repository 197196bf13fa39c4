//! Route table: common routes plus one route set per configured resource.

mod common;
mod resource;

pub use common::common_routes;
pub use resource::resource_routes;

use crate::error::AppError;
use crate::settings::Settings;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// HTTP-level options applied around the route table.
#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub cors_origin: HeaderValue,
    pub body_limit_bytes: usize,
}

impl From<&Settings> for HttpOptions {
    fn from(s: &Settings) -> Self {
        Self {
            cors_origin: s.cors_origin.clone(),
            body_limit_bytes: s.body_limit_bytes,
        }
    }
}

/// All routes without global layers.
pub fn api_routes(state: &AppState) -> Router {
    let mut router = common_routes(state.clone());
    for resource in state.registry.iter() {
        router = router.merge(resource_routes(state.resource_state(resource)));
    }
    router.fallback(route_not_found)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("route not found".into())
}

/// Full application: routes plus CORS, body limit and request tracing.
///
/// The limit is enforced by the JSON extractor, so oversized bodies get the
/// usual `{message, code}` 413 instead of a plain-text one.
pub fn app(state: &AppState, http: &HttpOptions) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(http.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    api_routes(state)
        .layer(DefaultBodyLimit::max(http.body_limit_bytes))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}
