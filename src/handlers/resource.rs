//! Resource CRUD handlers: list, create, read, replace, delete, delete all.

use crate::auth::AuthUser;
use crate::config::{Operation, ResolvedResource};
use crate::error::{AppError, RepositoryError};
use crate::response::{created, message, ok, MessageBody};
use crate::service::{Entity, RequestValidator};
use crate::sql::PgBindValue;
use crate::state::ResourceState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{Map, Value};

pub(crate) fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

pub(crate) fn body_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    match payload {
        Ok(Json(Value::Object(m))) => Ok(m),
        Ok(_) => Err(AppError::BadRequest("body must be a JSON object".into())),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge(rejection.body_text()))
        }
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}

/// Map a repository failure to the transport error for `op`.
pub(crate) fn repo_error(
    resource: &ResolvedResource,
    op: Operation,
    id: Option<i64>,
    err: RepositoryError,
) -> AppError {
    match err {
        RepositoryError::NotFound { id } => {
            tracing::warn!(resource = %resource.name, ?op, id, "not found");
            AppError::NotFound(resource.not_found_message(id))
        }
        RepositoryError::Infrastructure(ref e) => {
            tracing::error!(resource = %resource.name, ?op, ?id, error = %e, "store failure");
            AppError::Internal(
                err.store_message()
                    .unwrap_or_else(|| resource.fallback_message(op, id)),
            )
        }
    }
}

/// Replace plain values of hashed columns with their bcrypt hash.
async fn hash_columns(state: &ResourceState, op: Operation, entity: &mut Entity) -> Result<(), AppError> {
    let resource = state.repository.resource();
    for col in &resource.hashed_columns {
        let Some(plain) = entity.text(col) else {
            continue;
        };
        let hashed = state.hasher.hash(plain).await.map_err(|e| {
            tracing::error!(resource = %resource.name, error = %e, "password hashing failed");
            AppError::Internal(resource.fallback_message(op, None))
        })?;
        entity.set(col.clone(), PgBindValue::Text(Some(hashed)));
    }
    Ok(())
}

fn actor(user: &Option<Extension<AuthUser>>) -> Option<i64> {
    user.as_ref().map(|Extension(u)| u.user_id)
}

pub async fn list(State(state): State<ResourceState>) -> Result<Json<Vec<Value>>, AppError> {
    let resource = state.repository.resource();
    let rows = state
        .repository
        .list_active()
        .await
        .map_err(|e| repo_error(resource, Operation::List, None, e))?;
    Ok(Json(rows.into_iter().map(|r| resource.redact(r)).collect()))
}

pub async fn create(
    State(state): State<ResourceState>,
    user: Option<Extension<AuthUser>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let body = body_object(payload)?;
    let resource = state.repository.resource();
    let mut entity = RequestValidator::validate(resource, &resource.create_rules, &body)?;
    hash_columns(&state, Operation::Create, &mut entity).await?;
    let row = state
        .repository
        .insert(&entity)
        .await
        .map_err(|e| repo_error(resource, Operation::Create, None, e))?;
    tracing::info!(resource = %resource.name, id = ?row.get(&resource.pk_column), actor = ?actor(&user), "created");
    Ok(created(resource.redact(row)))
}

pub async fn read(
    State(state): State<ResourceState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = parse_id(&id_str)?;
    let resource = state.repository.resource();
    let row = state
        .repository
        .get_by_id(id)
        .await
        .map_err(|e| repo_error(resource, Operation::Read, Some(id), e))?;
    Ok(ok(resource.redact(row)))
}

pub async fn replace(
    State(state): State<ResourceState>,
    Path(id_str): Path<String>,
    user: Option<Extension<AuthUser>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = parse_id(&id_str)?;
    let body = body_object(payload)?;
    let resource = state.repository.resource();
    let mut entity = RequestValidator::validate(resource, &resource.replace_rules, &body)?;
    hash_columns(&state, Operation::Replace, &mut entity).await?;
    let row = state
        .repository
        .replace_by_id(id, &entity)
        .await
        .map_err(|e| repo_error(resource, Operation::Replace, Some(id), e))?;
    tracing::info!(resource = %resource.name, id, actor = ?actor(&user), "replaced");
    Ok(ok(resource.redact(row)))
}

pub async fn delete_one(
    State(state): State<ResourceState>,
    Path(id_str): Path<String>,
    user: Option<Extension<AuthUser>>,
) -> Result<(StatusCode, Json<MessageBody>), AppError> {
    let id = parse_id(&id_str)?;
    let resource = state.repository.resource();
    state
        .repository
        .delete_by_id(id)
        .await
        .map_err(|e| repo_error(resource, Operation::Delete, Some(id), e))?;
    tracing::info!(resource = %resource.name, id, actor = ?actor(&user), "deleted");
    Ok(message(resource.deleted_message()))
}

pub async fn delete_all(
    State(state): State<ResourceState>,
    user: Option<Extension<AuthUser>>,
) -> Result<(StatusCode, Json<MessageBody>), AppError> {
    let resource = state.repository.resource();
    let removed = state
        .repository
        .delete_all()
        .await
        .map_err(|e| repo_error(resource, Operation::DeleteAll, None, e))?;
    tracing::info!(resource = %resource.name, removed, actor = ?actor(&user), "deleted all");
    Ok(message(resource.deleted_all_message()))
}
