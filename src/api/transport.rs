//! Remote transport for REST API calls
//!
//! The [`Transport`] trait is the single "fetch JSON from URI" primitive the
//! endpoints are built on. [`HttpTransport`] is the reqwest-backed
//! implementation used outside of tests.

use super::error::{ApiError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid flooding the log file)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("dexcache/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Asynchronous JSON GET primitive
///
/// Implementations own headers, redirects, pooling and timeouts. They report
/// non-success statuses as [`ApiError::Status`] and undecodable bodies as
/// [`ApiError::Decode`].
pub trait Transport: Send + Sync {
    fn get_json(&self, url: Url) -> BoxFuture<'_, Result<Value>>;
}

/// Options used to build an [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP transport backed by a shared reqwest client
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request and decode the body as JSON
    pub async fn get(&self, url: Url) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        tracing::trace!("Response from {}: {} bytes", url, body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: Url) -> BoxFuture<'_, Result<Value>> {
        self.get(url).boxed()
    }
}
