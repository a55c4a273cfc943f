//! Commerce API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - Two credential schemes, applied independently per request:
//!   - catalog-namespace requests carry a consumer key/secret pair as query
//!     parameters
//!   - every request carries a bearer token when a local session holds one
//! - No retries, no caching, no timeouts: failures propagate to the caller
//!   carrying the underlying cause
//!
//! # Example
//!
//! ```rust,ignore
//! use lumiere_storefront::commerce::{CommerceClient, ProductFilter};
//!
//! let client = CommerceClient::new(&config.commerce);
//!
//! // Catalog reads (public credentials appended automatically)
//! let products = client.list_products(&ProductFilter::default()).await?;
//!
//! // Session-auth calls (bearer token attached once a login succeeded)
//! let token = client.login("amira", "hunter2").await?;
//! ```

mod client;
pub mod types;

pub use client::{ApiRequest, CommerceClient, ProductFilter, SortKey, SortOrder, TokenSlot};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP transport failed (DNS, connect, read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API returned status {status}: {body}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// JSON translation failed: decoding a response body, or encoding a
    /// request body before dispatch.
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be constructed.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = CommerceError::Status {
            status: 401,
            body: "{\"code\":\"invalid_credentials\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API returned status 401: {\"code\":\"invalid_credentials\"}"
        );
    }
}
