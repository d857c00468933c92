//! Caching client for paginated REST resource APIs
//!
//! Endpoints resolve individual resources by id (or, for named categories,
//! by case-insensitive name) and serve paginated listings, keeping every
//! fetched resource in memory so repeated lookups skip the network.
//!
//! - [`api`] - Transport, errors and the client that builds request URLs
//! - [`resource`] - Endpoints, caches, listings and the category registry
//! - [`config`] - Persistent user configuration

pub mod api;
pub mod config;
pub mod resource;

pub use api::{ApiClient, ApiError, Result};
pub use resource::{Endpoint, NamedEndpoint, NamedResource, PagedListing, Resource, ResourceKey};
