//! Paged listings
//!
//! [`Page`] is the public data shape of one listing response. A
//! [`PagedListing`] wraps a page together with a weak back-reference to the
//! endpoint that produced it, so further pages can be requested. The
//! back-reference is bookkeeping only: it is never serialized and never
//! takes part in equality.

use super::endpoint::{Endpoint, EndpointState};
use super::types::{Resource, ResourceRef};
use crate::api::{ApiError, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Weak;
use url::Url;

/// One page of a listing, exactly as the remote API returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<E> {
    pub count: usize,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<E>,
}

impl<E: Clone> Page<E> {
    /// Sub-page using `(offset, limit)` as literal `(start, end)` bounds;
    /// `count`, `next` and `previous` are carried over verbatim
    pub fn window(&self, offset: usize, limit: usize) -> Page<E> {
        let range = snapshot_window(self.results.len(), offset, limit);
        Page {
            count: self.count,
            next: self.next.clone(),
            previous: self.previous.clone(),
            results: self.results[range].to_vec(),
        }
    }
}

/// Slice bounds for a snapshot page: start at `offset`, end at `limit`
/// (not `offset + limit`), both clamped to `len`, empty when end <= start
pub fn snapshot_window(len: usize, offset: usize, limit: usize) -> Range<usize> {
    let start = offset.min(len);
    let end = limit.min(len).max(start);
    start..end
}

/// A page of listing results tied to its owning endpoint
pub struct PagedListing<T> {
    page: Page<ResourceRef>,
    endpoint: Weak<EndpointState<T>>,
}

impl<T: Resource> PagedListing<T> {
    pub(crate) fn new(page: Page<ResourceRef>, endpoint: Weak<EndpointState<T>>) -> Self {
        Self { page, endpoint }
    }

    /// The plain page data
    pub fn page(&self) -> &Page<ResourceRef> {
        &self.page
    }

    /// Request the page pointed to by `next`, if any
    pub async fn next_page(&self) -> Result<Option<PagedListing<T>>> {
        match self.page.next.as_deref() {
            Some(cursor) => self.follow(cursor).await.map(Some),
            None => Ok(None),
        }
    }

    /// Request the page pointed to by `previous`, if any
    pub async fn previous_page(&self) -> Result<Option<PagedListing<T>>> {
        match self.page.previous.as_deref() {
            Some(cursor) => self.follow(cursor).await.map(Some),
            None => Ok(None),
        }
    }

    async fn follow(&self, cursor: &str) -> Result<PagedListing<T>> {
        let endpoint = self
            .endpoint
            .upgrade()
            .map(Endpoint::from_state)
            .ok_or(ApiError::Detached)?;

        let (limit, offset) = parse_cursor(cursor)?;
        endpoint
            .list(limit.unwrap_or(endpoint.page_limit()), offset.unwrap_or(0))
            .await
    }
}

/// Extract `limit` and `offset` from a cursor URI
fn parse_cursor(cursor: &str) -> Result<(Option<usize>, Option<usize>)> {
    let url = Url::parse(cursor)?;
    let mut limit = None;
    let mut offset = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "limit" => limit = value.parse().ok(),
            "offset" => offset = value.parse().ok(),
            _ => {}
        }
    }

    Ok((limit, offset))
}

impl<T> Deref for PagedListing<T> {
    type Target = Page<ResourceRef>;

    fn deref(&self) -> &Self::Target {
        &self.page
    }
}

impl<T> Clone for PagedListing<T> {
    fn clone(&self) -> Self {
        Self {
            page: self.page.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<T> PartialEq for PagedListing<T> {
    fn eq(&self, other: &Self) -> bool {
        self.page == other.page
    }
}

impl<T> fmt::Debug for PagedListing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.page, f)
    }
}

impl<T> Serialize for PagedListing<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.page.serialize(serializer)
    }
}
