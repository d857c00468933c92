//! Named resource endpoint
//!
//! Wraps a base [`Endpoint`] with a [`NameIndex`] so resources can be looked
//! up by numeric id or by case-insensitive name. Every successful fetch goes
//! through this wrapper, which keeps the index in lockstep with the cache.

use super::cache::NameIndex;
use super::endpoint::Endpoint;
use super::listing::PagedListing;
use super::types::{normalize_name, NamedResource, ResourceKey};
use crate::api::{ApiClient, Result};
use std::sync::Arc;

/// Endpoint for a category whose resources carry unique names
pub struct NamedEndpoint<T> {
    endpoint: Endpoint<T>,
    names: Arc<NameIndex>,
}

impl<T> Clone for NamedEndpoint<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            names: Arc::clone(&self.names),
        }
    }
}

impl<T: NamedResource> NamedEndpoint<T> {
    pub fn new(client: ApiClient, category: &str) -> Self {
        Self {
            endpoint: Endpoint::new(client, category),
            names: Arc::new(NameIndex::new()),
        }
    }

    pub fn category(&self) -> &str {
        self.endpoint.category()
    }

    pub fn cached_len(&self) -> usize {
        self.endpoint.cached_len()
    }

    /// Number of names in the index
    pub fn indexed_names(&self) -> usize {
        self.names.len()
    }

    /// Cached resource by id or name; never touches the transport
    pub fn get(&self, key: impl Into<ResourceKey>) -> Option<Arc<T>> {
        match key.into() {
            ResourceKey::Id(id) => self.endpoint.get(id),
            ResourceKey::Name(name) => self
                .names
                .lookup(&name)
                .and_then(|id| self.endpoint.get(id)),
        }
    }

    /// Cached resource by id or name, fetching it on a miss
    pub async fn resolve(&self, key: impl Into<ResourceKey>) -> Result<Arc<T>> {
        let key = key.into();
        if let Some(hit) = self.get(key.clone()) {
            tracing::trace!("{}/{}: cache hit", self.category(), key);
            return Ok(hit);
        }
        tracing::debug!("{}/{}: cache miss", self.category(), key);
        self.fetch(key).await
    }

    pub async fn resolve_by_name(&self, name: &str) -> Result<Arc<T>> {
        self.resolve(ResourceKey::from(name)).await
    }

    /// Fetch by id or name and cache the result under both
    pub async fn fetch(&self, key: impl Into<ResourceKey>) -> Result<Arc<T>> {
        self.fetch_with(key, true).await
    }

    /// Like [`NamedEndpoint::fetch`]; `cache_result` is not consulted.
    /// Names are lower-cased before being put in the request path.
    pub async fn fetch_with(
        &self,
        key: impl Into<ResourceKey>,
        cache_result: bool,
    ) -> Result<Arc<T>> {
        let segment = match key.into() {
            ResourceKey::Id(id) => id.to_string(),
            ResourceKey::Name(name) => normalize_name(&name),
        };

        let resource = self.endpoint.fetch_segment(&segment, cache_result).await?;
        if let Some(name) = resource.name() {
            self.names.insert(name, resource.id());
        }

        Ok(resource)
    }

    pub async fn list(&self, limit: usize, offset: usize) -> Result<PagedListing<T>> {
        self.endpoint.list(limit, offset).await
    }

    pub async fn first_page(&self) -> Result<PagedListing<T>> {
        self.endpoint.first_page().await
    }

    pub async fn list_all(&self) -> Result<Arc<PagedListing<T>>> {
        self.endpoint.list_all().await
    }

    pub async fn list_all_with(&self, cache_snapshot: bool) -> Result<Arc<PagedListing<T>>> {
        self.endpoint.list_all_with(cache_snapshot).await
    }

    pub fn snapshot(&self) -> Option<Arc<PagedListing<T>>> {
        self.endpoint.snapshot()
    }

    pub fn has_snapshot(&self) -> bool {
        self.endpoint.has_snapshot()
    }
}

impl<T> std::fmt::Debug for NamedEndpoint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedEndpoint")
            .field("endpoint", &self.endpoint)
            .field("names", &self.names.len())
            .finish()
    }
}
