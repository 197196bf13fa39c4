//! Login: match stored credentials and mint an access/refresh credential pair.

use crate::auth::TokenPair;
use crate::config::Operation;
use crate::error::AppError;
use crate::handlers::resource::{body_object, repo_error};
use crate::response::ok;
use crate::service::RequestValidator;
use crate::state::ResourceState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

const INVALID_LOGIN: &str = "Invalid email or password.";

fn invalid_login() -> AppError {
    AppError::Unauthorized(INVALID_LOGIN.into())
}

pub async fn login(
    State(state): State<ResourceState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenPair>), AppError> {
    let body = body_object(payload)?;
    let resource = state.repository.resource();
    let failed = || AppError::Internal(resource.fallback_message(Operation::Login, None));
    let creds = resource.credentials.as_ref().ok_or_else(failed)?;
    let entity = RequestValidator::validate(resource, &resource.create_rules, &body)?;

    let identity = entity.get(&creds.identity).cloned().ok_or_else(invalid_login)?;
    let secret = entity.text(&creds.secret).ok_or_else(invalid_login)?;

    let row = state
        .repository
        .find_by(&creds.identity, identity)
        .await
        .map_err(|e| repo_error(resource, Operation::Login, None, e))?
        .ok_or_else(|| {
            tracing::debug!(resource = %resource.name, "login: unknown identity");
            invalid_login()
        })?;

    let stored = row.get(&creds.secret).and_then(Value::as_str).unwrap_or_default();
    let matched = state.hasher.verify(secret, stored).await.map_err(|e| {
        tracing::error!(error = %e, "password verification failed");
        failed()
    })?;
    if !matched {
        tracing::debug!(resource = %resource.name, "login: wrong secret");
        return Err(invalid_login());
    }

    let user_id = row
        .get(&resource.pk_column)
        .and_then(Value::as_i64)
        .ok_or_else(failed)?;
    let pair = state.tokens.issue_pair(user_id).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        failed()
    })?;
    tracing::info!(resource = %resource.name, user_id, "logged in");
    Ok(ok(pair))
}
