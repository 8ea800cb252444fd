//! Mutation dispatchers
//!
//! Wraps a [`BlueprintBackend`] so that every successful mutation invalidates
//! the cached blueprint listings, and each mutation kind exposes its current
//! status the way the review footer and the delete modal read it.
//!
//! Failures are returned to the caller and recorded in the status. There is
//! no retry.

use std::collections::HashMap;

use strum::Display;
use tracing::{error, info};

use crate::api::cache::{query_key, CacheTag, QueryCache};
use crate::api::client::BlueprintBackend;
use crate::api::models::{
    BlueprintResponse, BlueprintsQuery, BlueprintsResponse, ComposeResponse,
    CreateBlueprintRequest, CreateBlueprintResponse,
};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Compose,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error(String),
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Blueprint mutations with cache invalidation and status tracking.
#[derive(Debug)]
pub struct MutationDispatcher<B> {
    backend: B,
    cache: QueryCache,
    statuses: HashMap<MutationKind, MutationStatus>,
}

impl<B: BlueprintBackend> MutationDispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: QueryCache::new(),
            statuses: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn status(&self, kind: MutationKind) -> &MutationStatus {
        const IDLE: &MutationStatus = &MutationStatus::Idle;
        self.statuses.get(&kind).unwrap_or(IDLE)
    }

    /// Back to idle, e.g. after the wizard closes
    pub fn reset(&mut self, kind: MutationKind) {
        self.statuses.remove(&kind);
    }

    fn begin(&mut self, kind: MutationKind) {
        self.statuses.insert(kind, MutationStatus::Pending);
    }

    fn finish<T>(&mut self, kind: MutationKind, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => {
                info!(%kind, "blueprint mutation succeeded");
                self.statuses.insert(kind, MutationStatus::Success);
                self.cache.invalidate(CacheTag::Blueprints);
            }
            Err(e) => {
                error!(%kind, error = %e, "blueprint mutation failed");
                self.statuses.insert(kind, MutationStatus::Error(e.to_string()));
            }
        }
        result
    }

    pub async fn create(&mut self, request: &CreateBlueprintRequest) -> Result<CreateBlueprintResponse> {
        self.begin(MutationKind::Create);
        let result = self.backend.create_blueprint(request).await;
        self.finish(MutationKind::Create, result)
    }

    pub async fn update(
        &mut self,
        id: &str,
        request: &CreateBlueprintRequest,
    ) -> Result<CreateBlueprintResponse> {
        self.begin(MutationKind::Update);
        let result = self.backend.update_blueprint(id, request).await;
        self.finish(MutationKind::Update, result)
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.begin(MutationKind::Delete);
        let result = self.backend.delete_blueprint(id).await;
        self.finish(MutationKind::Delete, result)
    }

    pub async fn compose(&mut self, id: &str) -> Result<Vec<ComposeResponse>> {
        self.begin(MutationKind::Compose);
        let result = self.backend.compose_blueprint(id).await;
        self.finish(MutationKind::Compose, result)
    }

    /// Blueprint listing, served from the cache until a mutation invalidates it
    pub async fn list_blueprints(&mut self, query: &BlueprintsQuery) -> Result<BlueprintsResponse> {
        let key = query_key(&query.to_query_pairs());
        if let Some(cached) = self.cache.get(CacheTag::Blueprints, &key) {
            return Ok(cached);
        }
        let response = self.backend.list_blueprints(query).await?;
        self.cache.insert(CacheTag::Blueprints, key, &response)?;
        Ok(response)
    }

    pub async fn get_blueprint(&self, id: &str) -> Result<BlueprintResponse> {
        self.backend.get_blueprint(id).await
    }
}
