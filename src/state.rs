//! Shared application state. Everything is built once at startup and read-only afterwards.

use crate::auth::{PasswordHasher, TokenKeys};
use crate::config::{ResolvedResource, ResourceRegistry};
use crate::service::ResourceRepository;
use crate::store::Gateway;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub registry: Arc<ResourceRegistry>,
    pub hasher: PasswordHasher,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        registry: ResourceRegistry,
        hasher: PasswordHasher,
        tokens: TokenKeys,
    ) -> Self {
        Self {
            gateway,
            registry: Arc::new(registry),
            hasher,
            tokens: Arc::new(tokens),
        }
    }

    /// State for the routes of one resource.
    pub fn resource_state(&self, resource: &ResolvedResource) -> ResourceState {
        ResourceState {
            repository: ResourceRepository::new(self.gateway.clone(), Arc::new(resource.clone())),
            hasher: self.hasher,
            tokens: self.tokens.clone(),
        }
    }
}

/// Per-resource handler state: the repository plus what create and login need.
#[derive(Clone)]
pub struct ResourceState {
    pub repository: ResourceRepository,
    pub hasher: PasswordHasher,
    pub tokens: Arc<TokenKeys>,
}
