//! Resource routes built from the resolved resource: one route per enabled operation,
//! with the bearer gate layered onto protected operations only.

use crate::auth::require_bearer;
use crate::config::Operation;
use crate::error::AppError;
use crate::handlers::{create, delete_all, delete_one, list, login, read, replace};
use crate::state::ResourceState;
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};

enum Target {
    Collection,
    Member,
    Login,
}

fn operation_route(op: Operation) -> (Target, MethodRouter<ResourceState>) {
    match op {
        Operation::List => (Target::Collection, get(list)),
        Operation::Create => (Target::Collection, post(create)),
        Operation::DeleteAll => (Target::Collection, delete(delete_all)),
        Operation::Read => (Target::Member, get(read)),
        Operation::Replace => (Target::Member, put(replace)),
        Operation::Delete => (Target::Member, delete(delete_one)),
        Operation::Login => (Target::Login, post(login)),
    }
}

fn merged(slot: Option<MethodRouter<ResourceState>>, m: MethodRouter<ResourceState>) -> Option<MethodRouter<ResourceState>> {
    Some(match slot {
        Some(existing) => existing.merge(m),
        None => m,
    })
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("method not allowed".into())
}

/// `/{segment}`, `/{segment}/:id` and `/{segment}/login` for the operations the resource enables.
pub fn resource_routes(state: ResourceState) -> Router {
    let resource = state.repository.resource();
    let segment = resource.path_segment.clone();
    let mut collection = None;
    let mut member = None;
    let mut login_route = None;

    for op in Operation::ALL {
        if !resource.allows(op) {
            continue;
        }
        let (target, mut method) = operation_route(op);
        if resource.is_protected(op) {
            method = method.route_layer(from_fn_with_state(state.tokens.clone(), require_bearer));
        }
        match target {
            Target::Collection => collection = merged(collection, method),
            Target::Member => member = merged(member, method),
            Target::Login => login_route = merged(login_route, method),
        }
    }

    let mut router = Router::new();
    if let Some(m) = collection {
        router = router.route(&format!("/{}", segment), m.fallback(method_not_allowed));
    }
    if let Some(m) = login_route {
        router = router.route(&format!("/{}/login", segment), m.fallback(method_not_allowed));
    }
    if let Some(m) = member {
        router = router.route(&format!("/{}/:id", segment), m.fallback(method_not_allowed));
    }
    router.with_state(state)
}
