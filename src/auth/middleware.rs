//! Bearer gate for protected operations.

use crate::auth::{AuthError, TokenKeys};
use crate::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Identity taken from a verified access credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Gate for protected operations: no credential is 401, a bad one is 400.
pub async fn require_bearer(
    State(tokens): State<Arc<TokenKeys>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!(path = %request.uri().path(), "access token missing");
        AppError::Unauthorized(AuthError::Missing.to_string())
    })?;
    let claims = tokens.verify_access(&token).map_err(|e| {
        tracing::debug!(error = ?e, "access token rejected");
        AppError::BadRequest(e.to_string())
    })?;
    request.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
    });
    Ok(next.run(request).await)
}

/// Header value, with or without a `Bearer` prefix. Empty counts as missing.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match raw.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => raw,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn accepts_raw_and_bearer_forms() {
        assert_eq!(bearer_token(&headers("abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_header_counts_as_missing() {
        assert_eq!(bearer_token(&headers("")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn bearer_prefix_needs_a_separator() {
        assert_eq!(bearer_token(&headers("Bearer   abc")).as_deref(), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearerabc")).as_deref(), Some("Bearerabc"));
    }
}
