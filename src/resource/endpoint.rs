//! Resource endpoint
//!
//! An [`Endpoint`] serves one resource category. It answers id lookups from
//! its in-memory cache when it can, fetches from the transport when it
//! can't, and serves listings either from the transport or from a captured
//! full-listing snapshot.

use super::cache::ResourceCache;
use super::listing::{Page, PagedListing};
use super::types::{Resource, ResourceRef};
use crate::api::{ApiClient, Result};
use std::sync::{Arc, PoisonError, RwLock};

/// Default number of results per page
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// State shared by all clones of an endpoint
pub(crate) struct EndpointState<T> {
    client: ApiClient,
    category: String,
    page_limit: usize,
    cache: ResourceCache<T>,
    snapshot: RwLock<Option<Arc<PagedListing<T>>>>,
}

/// Cached access to one resource category, addressed by numeric id
pub struct Endpoint<T> {
    state: Arc<EndpointState<T>>,
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Resource> Endpoint<T> {
    /// Create an endpoint for `category` with empty cache and no snapshot
    pub fn new(client: ApiClient, category: &str) -> Self {
        let page_limit = client.page_limit();
        Self {
            state: Arc::new(EndpointState {
                client,
                category: category.to_string(),
                page_limit,
                cache: ResourceCache::new(),
                snapshot: RwLock::new(None),
            }),
        }
    }

    pub(crate) fn from_state(state: Arc<EndpointState<T>>) -> Self {
        Self { state }
    }

    pub fn category(&self) -> &str {
        &self.state.category
    }

    /// Page size used by [`Endpoint::first_page`] and cursors without `limit`
    pub fn page_limit(&self) -> usize {
        self.state.page_limit
    }

    /// Number of cached resources
    pub fn cached_len(&self) -> usize {
        self.state.cache.len()
    }

    /// Cached resource for `id`; never touches the transport
    pub fn get(&self, id: u64) -> Option<Arc<T>> {
        self.state.cache.get(id)
    }

    /// Cached resource for `id`, fetching it on a miss
    ///
    /// Concurrent misses for the same id are not coalesced: each issues its
    /// own request and the cache entry is overwritten by the later one.
    pub async fn resolve(&self, id: u64) -> Result<Arc<T>> {
        if let Some(hit) = self.get(id) {
            tracing::trace!("{}/{}: cache hit", self.category(), id);
            return Ok(hit);
        }
        tracing::debug!("{}/{}: cache miss", self.category(), id);
        self.fetch(id).await
    }

    /// Fetch `id` from the transport and cache the result
    pub async fn fetch(&self, id: u64) -> Result<Arc<T>> {
        self.fetch_with(id, true).await
    }

    /// Like [`Endpoint::fetch`]. `cache_result` is accepted but not
    /// consulted: successful fetches are always cached.
    pub async fn fetch_with(&self, id: u64, cache_result: bool) -> Result<Arc<T>> {
        self.fetch_segment(&id.to_string(), cache_result).await
    }

    pub(crate) async fn fetch_segment(&self, segment: &str, cache_result: bool) -> Result<Arc<T>> {
        if !cache_result {
            tracing::debug!(
                "{}/{}: cache_result=false is ignored, result will be cached",
                self.category(),
                segment
            );
        }

        let url = self.state.client.resource_url(self.category(), segment)?;
        let value = self.state.client.get(url).await?;
        let resource: Arc<T> = Arc::new(serde_json::from_value(value)?);

        self.state.cache.insert(resource.id(), Arc::clone(&resource));
        tracing::debug!(
            "{}/{}: cached as id {} ({} entries)",
            self.category(),
            segment,
            resource.id(),
            self.cached_len()
        );

        Ok(resource)
    }

    /// One page of the listing
    ///
    /// With a snapshot present the page is cut from it locally, using
    /// `offset` as the start index and `limit` as the end index. Without a
    /// snapshot the transport is asked for `?limit={limit}&offset={offset}`.
    pub async fn list(&self, limit: usize, offset: usize) -> Result<PagedListing<T>> {
        if let Some(snapshot) = self.snapshot() {
            tracing::trace!(
                "{}: listing [{}..{}] from snapshot",
                self.category(),
                offset,
                limit
            );
            return Ok(self.listing(snapshot.window(offset, limit)));
        }

        let page = self.request_page(limit, offset).await?;
        Ok(self.listing(page))
    }

    /// First page with the default page size
    pub async fn first_page(&self) -> Result<PagedListing<T>> {
        self.list(self.page_limit(), 0).await
    }

    /// Every item of the category, captured as the endpoint's snapshot
    pub async fn list_all(&self) -> Result<Arc<PagedListing<T>>> {
        self.list_all_with(true).await
    }

    /// Every item of the category
    ///
    /// Returns the existing snapshot when there is one. Otherwise reads the
    /// total count with `limit=1`, then requests `limit={count}`. The result
    /// becomes the snapshot when `cache_snapshot` is set. A failure in either
    /// request stores nothing.
    pub async fn list_all_with(&self, cache_snapshot: bool) -> Result<Arc<PagedListing<T>>> {
        if let Some(snapshot) = self.snapshot() {
            tracing::trace!("{}: full listing served from snapshot", self.category());
            return Ok(snapshot);
        }

        let probe = self.request_page(1, 0).await?;
        tracing::debug!("{}: fetching all {} items", self.category(), probe.count);

        let page = self.request_page(probe.count, 0).await?;
        let listing = Arc::new(self.listing(page));

        if !cache_snapshot {
            return Ok(listing);
        }

        let mut slot = self
            .state
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // A concurrent call may have won the race; the first snapshot stays.
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing));
        }

        tracing::info!(
            "{}: snapshot captured ({} items)",
            self.category(),
            listing.results.len()
        );
        *slot = Some(Arc::clone(&listing));
        Ok(listing)
    }

    /// The captured full listing, if any
    pub fn snapshot(&self) -> Option<Arc<PagedListing<T>>> {
        self.state
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot().is_some()
    }

    async fn request_page(&self, limit: usize, offset: usize) -> Result<Page<ResourceRef>> {
        let url = self
            .state
            .client
            .listing_url(self.category(), limit, offset)?;
        let value = self.state.client.get(url).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn listing(&self, page: Page<ResourceRef>) -> PagedListing<T> {
        PagedListing::new(page, Arc::downgrade(&self.state))
    }
}

impl<T> std::fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("category", &self.state.category)
            .field("cached", &self.state.cache.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::resource::mock::{berry, listing_body, MockTransport, BASE};
    use crate::resource::GenericResource;
    use serde_json::json;

    fn endpoint(mock: &Arc<MockTransport>) -> Endpoint<GenericResource> {
        mock.client().endpoint("berry")
    }

    #[tokio::test]
    async fn test_get_on_empty_cache_is_none() {
        let mock = MockTransport::new();
        let berries = endpoint(&mock);

        assert!(berries.get(1).is_none());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_populates_cache() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry/1"), berry(1, "cheri"));
        let berries = endpoint(&mock);

        let fetched = berries.fetch(1).await.unwrap();
        assert_eq!(fetched.name.as_deref(), Some("cheri"));

        let cached = berries.get(1).unwrap();
        assert!(Arc::ptr_eq(&fetched, &cached));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_always_hits_transport() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry/1"), berry(1, "cheri"));
        let berries = endpoint(&mock);

        berries.fetch(1).await.unwrap();
        berries.fetch(1).await.unwrap();
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_without_cache_flag_still_caches() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry/2"), berry(2, "chesto"));
        let berries = endpoint(&mock);

        berries.fetch_with(2, false).await.unwrap();
        assert!(berries.get(2).is_some());
    }

    #[tokio::test]
    async fn test_fetch_caches_under_response_id() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry/99"), berry(3, "pecha"));
        let berries = endpoint(&mock);

        berries.fetch(99).await.unwrap();
        assert!(berries.get(3).is_some());
        assert!(berries.get(99).is_none());
    }

    #[tokio::test]
    async fn test_resolve_hit_issues_no_request() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry/1"), berry(1, "cheri"));
        let berries = endpoint(&mock);

        let first = berries.resolve(1).await.unwrap();
        let second = berries.resolve(1).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_failure_propagates() {
        let mock = MockTransport::new();
        let berries = endpoint(&mock);

        let err = berries.resolve(404).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
        assert!(berries.get(404).is_none());
        assert_eq!(berries.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_fetch_decode_failure() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry/1"), json!({"name": "no-id"}));
        let berries = endpoint(&mock);

        let err = berries.fetch(1).await.unwrap_err();
        assert!(err.is_decode());
        assert_eq!(berries.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_not_coalesced() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry/1"), berry(1, "cheri"));
        let berries = endpoint(&mock);

        let (a, b) = futures::join!(berries.resolve(1), berries.resolve(1));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(mock.request_count(), 2);
        assert_eq!(berries.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_list_without_snapshot_requests_page() {
        let mock = MockTransport::new();
        mock.respond(
            &format!("{BASE}/berry?limit=10&offset=5"),
            listing_body(64, 5..15),
        );
        let berries = endpoint(&mock);

        let page = berries.list(10, 5).await.unwrap();
        assert_eq!(page.count, 64);
        assert_eq!(page.results.len(), 10);
        assert_eq!(page.results[0].id(), Some(6));
        assert_eq!(
            mock.requests(),
            vec![format!("{BASE}/berry?limit=10&offset=5")]
        );
    }

    #[tokio::test]
    async fn test_first_page_uses_default_limit() {
        let mock = MockTransport::new();
        mock.respond(
            &format!("{BASE}/berry?limit=20&offset=0"),
            listing_body(64, 0..20),
        );
        let berries = endpoint(&mock);

        let page = berries.first_page().await.unwrap();
        assert_eq!(page.results.len(), DEFAULT_PAGE_LIMIT);
    }

    #[tokio::test]
    async fn test_list_all_two_requests_then_snapshot() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry?limit=1&offset=0"), listing_body(30, 0..1));
        mock.respond(&format!("{BASE}/berry?limit=30&offset=0"), listing_body(30, 0..30));
        let berries = endpoint(&mock);

        let first = berries.list_all().await.unwrap();
        let second = berries.list_all().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.results.len(), 30);
        assert_eq!(
            mock.requests(),
            vec![
                format!("{BASE}/berry?limit=1&offset=0"),
                format!("{BASE}/berry?limit=30&offset=0"),
            ]
        );
        assert!(berries.has_snapshot());
    }

    #[tokio::test]
    async fn test_list_all_without_caching_snapshot() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry?limit=1&offset=0"), listing_body(3, 0..1));
        mock.respond(&format!("{BASE}/berry?limit=3&offset=0"), listing_body(3, 0..3));
        let berries = endpoint(&mock);

        berries.list_all_with(false).await.unwrap();
        assert!(!berries.has_snapshot());

        berries.list_all_with(false).await.unwrap();
        assert_eq!(mock.request_count(), 4);
    }

    #[tokio::test]
    async fn test_list_all_failure_stores_nothing() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry?limit=1&offset=0"), listing_body(30, 0..1));
        let berries = endpoint(&mock);

        assert!(berries.list_all().await.is_err());
        assert!(!berries.has_snapshot());
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_list_slices_snapshot_with_literal_bounds() {
        let mock = MockTransport::new();
        mock.respond(&format!("{BASE}/berry?limit=1&offset=0"), listing_body(30, 0..1));
        mock.respond(&format!("{BASE}/berry?limit=30&offset=0"), listing_body(30, 0..30));
        let berries = endpoint(&mock);
        berries.list_all().await.unwrap();

        let page = berries.list(10, 5).await.unwrap();
        assert_eq!(page.results.len(), 5);
        assert_eq!(page.results[0].id(), Some(6));
        assert_eq!(page.count, 30);

        let past = berries.list(10, 15).await.unwrap();
        assert!(past.results.is_empty());

        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_next_page_follows_cursor() {
        let mock = MockTransport::new();
        let mut first = listing_body(64, 0..20);
        first["next"] = json!(format!("{BASE}/berry?offset=20&limit=20"));
        mock.respond(&format!("{BASE}/berry?limit=20&offset=0"), first);
        mock.respond(
            &format!("{BASE}/berry?limit=20&offset=20"),
            listing_body(64, 20..40),
        );
        let berries = endpoint(&mock);

        let page = berries.first_page().await.unwrap();
        let next = page.next_page().await.unwrap().unwrap();
        assert_eq!(next.results[0].id(), Some(21));

        assert!(next.previous_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cursor_defaults_for_missing_limit_and_offset() {
        let mock = MockTransport::new();
        let mut first = listing_body(64, 0..20);
        first["next"] = json!(format!("{BASE}/berry?offset=40"));
        first["previous"] = json!(format!("{BASE}/berry?limit=5"));
        mock.respond(&format!("{BASE}/berry?limit=20&offset=0"), first);
        mock.respond(
            &format!("{BASE}/berry?limit=20&offset=40"),
            listing_body(64, 40..60),
        );
        mock.respond(
            &format!("{BASE}/berry?limit=5&offset=0"),
            listing_body(64, 0..5),
        );
        let berries = endpoint(&mock);

        let page = berries.first_page().await.unwrap();
        let next = page.next_page().await.unwrap().unwrap();
        let previous = page.previous_page().await.unwrap().unwrap();

        assert_eq!(next.results[0].id(), Some(41));
        assert_eq!(previous.results.len(), 5);
        assert_eq!(
            mock.requests(),
            vec![
                format!("{BASE}/berry?limit=20&offset=0"),
                format!("{BASE}/berry?limit=20&offset=40"),
                format!("{BASE}/berry?limit=5&offset=0"),
            ]
        );
    }

    #[tokio::test]
    async fn test_previous_page_follows_cursor() {
        let mock = MockTransport::new();
        let mut second = listing_body(64, 20..40);
        second["previous"] = json!(format!("{BASE}/berry?offset=0&limit=20"));
        mock.respond(&format!("{BASE}/berry?limit=20&offset=20"), second);
        mock.respond(
            &format!("{BASE}/berry?limit=20&offset=0"),
            listing_body(64, 0..20),
        );
        let berries = endpoint(&mock);

        let page = berries.list(20, 20).await.unwrap();
        let previous = page.previous_page().await.unwrap().unwrap();

        assert_eq!(previous.results[0].id(), Some(1));
        assert_eq!(
            mock.requests().last().map(String::as_str),
            Some(format!("{BASE}/berry?limit=20&offset=0").as_str())
        );
    }

    #[tokio::test]
    async fn test_next_page_after_endpoint_dropped() {
        let mock = MockTransport::new();
        let mut first = listing_body(64, 0..20);
        first["next"] = json!(format!("{BASE}/berry?offset=20&limit=20"));
        mock.respond(&format!("{BASE}/berry?limit=20&offset=0"), first);
        let berries = endpoint(&mock);

        let page = berries.first_page().await.unwrap();
        drop(berries);

        assert!(matches!(page.next_page().await, Err(ApiError::Detached)));
    }

    #[tokio::test]
    async fn test_listing_serializes_page_only() {
        let mock = MockTransport::new();
        let body = listing_body(2, 0..2);
        mock.respond(&format!("{BASE}/berry?limit=2&offset=0"), body.clone());
        let berries = endpoint(&mock);

        let page = berries.list(2, 0).await.unwrap();
        assert_eq!(serde_json::to_value(&page).unwrap(), body);
    }
}
