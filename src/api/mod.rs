//! Remote API access
//!
//! # Module Structure
//!
//! - [`client`] - Client combining a transport with the API base URL
//! - [`error`] - Transport and decode error kinds
//! - [`transport`] - The JSON GET primitive and its HTTP implementation
//!
//! # Example
//!
//! ```ignore
//! use dexcache::api::{ApiClient, TransportOptions, DEFAULT_BASE_URL};
//! use dexcache::resource::GenericResource;
//!
//! async fn example() -> dexcache::api::Result<()> {
//!     let client = ApiClient::http(DEFAULT_BASE_URL, &TransportOptions::default())?;
//!     let berries = client.named_endpoint::<GenericResource>("berry");
//!     let cheri = berries.resolve("Cheri").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use transport::{HttpTransport, Transport, TransportOptions};
