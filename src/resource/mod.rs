//! Resource resolution and caching
//!
//! # Architecture
//!
//! - [`endpoint`] - Id-addressed endpoint with resource cache and listing snapshot
//! - [`named`] - Name index wrapped around an endpoint for id-or-name lookups
//! - [`cache`] - The resource cache and name index structures
//! - [`listing`] - Page data and listings tied to their endpoint
//! - [`registry`] - Known categories, loaded from embedded JSON
//! - [`types`] - Resource traits, lookup keys and the schema-less resource
//!
//! # Example
//!
//! ```ignore
//! use dexcache::resource::GenericResource;
//!
//! async fn example(client: &dexcache::api::ApiClient) -> dexcache::api::Result<()> {
//!     let berries = client.named_endpoint::<GenericResource>("berry");
//!     berries.fetch(1u64).await?;
//!     assert!(berries.get("CHERI").is_some());
//!     let everything = berries.list_all().await?;
//!     println!("{} berries", everything.count);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod endpoint;
pub mod listing;
pub mod named;
pub mod registry;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use cache::{NameIndex, ResourceCache};
pub use endpoint::{Endpoint, DEFAULT_PAGE_LIMIT};
pub use listing::{snapshot_window, Page, PagedListing};
pub use named::NamedEndpoint;
pub use registry::*;
pub use types::{normalize_name, GenericResource, NamedResource, Resource, ResourceKey, ResourceRef};
