//! Error types for remote API access
//!
//! Every failure raised by the transport or while decoding a response
//! propagates unchanged through the endpoint operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Listing is detached from its endpoint")]
    Detached,
}

impl ApiError {
    /// Network or HTTP-level failure reported by the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Http(_) | ApiError::Status { .. })
    }

    /// Response body was not JSON or did not match the expected shape
    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Decode(_))
    }

    /// HTTP status code, when the remote answered with a non-success status
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
