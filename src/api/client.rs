//! API Client
//!
//! Combines a transport with the API base URL and hands out endpoints for
//! individual resource categories.

use super::error::Result;
use super::transport::{HttpTransport, Transport, TransportOptions};
use crate::resource::{Endpoint, NamedEndpoint, NamedResource, Resource, DEFAULT_PAGE_LIMIT};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Main API client
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base: String,
    page_limit: usize,
}

impl ApiClient {
    /// Create a client on top of an existing transport
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let parsed = Url::parse(base_url)?;
        let base = parsed.as_str().trim_end_matches('/').to_string();
        tracing::debug!("API client base URL: {}", base);

        Ok(Self {
            transport,
            base,
            page_limit: DEFAULT_PAGE_LIMIT,
        })
    }

    /// Set the default page size handed to endpoints created afterwards
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Create a client backed by an [`HttpTransport`]
    pub fn http(base_url: &str, options: &TransportOptions) -> Result<Self> {
        let transport = HttpTransport::new(options)?;
        Self::new(base_url, Arc::new(transport))
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn page_limit(&self) -> usize {
        self.page_limit
    }

    /// Make a GET request through the transport
    pub async fn get(&self, url: Url) -> Result<Value> {
        self.transport.get_json(url).await
    }

    /// Build `{base}/{category}/{segment}`
    pub fn resource_url(&self, category: &str, segment: &str) -> Result<Url> {
        let url = format!(
            "{}/{}/{}",
            self.base,
            category,
            urlencoding::encode(segment)
        );
        Ok(Url::parse(&url)?)
    }

    /// Build `{base}/{category}?limit={limit}&offset={offset}`
    pub fn listing_url(&self, category: &str, limit: usize, offset: usize) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/{}", self.base, category),
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )?;
        Ok(url)
    }

    /// Endpoint for a category addressed by numeric id only
    pub fn endpoint<T: Resource>(&self, category: &str) -> Endpoint<T> {
        Endpoint::new(self.clone(), category)
    }

    /// Endpoint for a category addressed by id or case-insensitive name
    pub fn named_endpoint<T: NamedResource>(&self, category: &str) -> NamedEndpoint<T> {
        NamedEndpoint::new(self.clone(), category)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base)
            .field("page_limit", &self.page_limit)
            .finish_non_exhaustive()
    }
}
