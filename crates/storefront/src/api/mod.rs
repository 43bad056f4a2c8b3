//! Storefront REST API client.
//!
//! # Architecture
//!
//! - One `reqwest` client shared behind an `Arc`, cheap to clone
//! - The API is the source of truth - no local sync, direct calls
//! - Products and categories are cached in memory via `moka`; cart and order
//!   calls are never cached
//!
//! # Resources
//!
//! - [`catalog`] - products and categories
//! - [`cart`] - the signed-in shopper's server-side cart
//! - [`orders`] - order placement, history, tracking and cancellation
//! - [`admin`] - dashboard stats and product CRUD
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::api::{ApiClient, ProductQuery};
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let products = client.list_products(&ProductQuery::default()).await?;
//! let order = client.get_order(&order_id).await?;
//! ```

pub mod admin;
mod cache;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod types;

pub use types::*;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

use cache::CacheValue;

/// Longest slice of a response body kept in errors and logs.
const BODY_SNIPPET_LEN: usize = 500;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected shopper token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Route could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Request rejected locally before being sent.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Whether the failure is on the server or transport side rather than
    /// caused by the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::Url(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::RateLimited(_) | Self::BadRequest(_) => {
                false
            }
        }
    }
}

/// Error body shape used by the API (`{"message": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Provides typed access to the catalog, the shopper's cart, orders and the
/// admin surface. Products and categories are cached for the configured TTL.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    authenticated: bool,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        if let Some(bearer) = config.bearer() {
            let mut value = HeaderValue::from_str(&bearer)
                .map_err(|e| ApiError::BadRequest(format!("Invalid token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .support_invalidation_closures()
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                authenticated: config.is_authenticated(),
                cache,
            }),
        })
    }

    /// Whether requests carry a shopper token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.authenticated
    }

    /// Build a request for a route relative to the base URL.
    fn request(&self, method: Method, route: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(route)?;
        Ok(self.inner.client.request(method, url))
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, ApiError> {
        let text = self.send(request, resource).await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                resource,
                body = %snippet(&text),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is ignored.
    async fn send_empty(&self, request: RequestBuilder, resource: &str) -> Result<(), ApiError> {
        self.send(request, resource).await.map(|_| ())
    }

    /// Send a request, map failure statuses and return the body text.
    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let message = error_message(&text).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(resource.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ApiError::Unauthorized(message))
            }
            _ => {
                if status.is_server_error() {
                    tracing::error!(
                        status = %status,
                        resource,
                        body = %snippet(&text),
                        "API returned server error"
                    );
                }
                Err(ApiError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = ApiError::Api {
            status: 422,
            message: "Price must be positive".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 422 - Price must be positive");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_server_error_classification() {
        assert!(
            ApiError::Api {
                status: 503,
                message: String::new()
            }
            .is_server_error()
        );
        assert!(
            !ApiError::Api {
                status: 400,
                message: String::new()
            }
            .is_server_error()
        );
        assert!(!ApiError::NotFound("x".into()).is_server_error());
        assert!(!ApiError::Unauthorized("x".into()).is_server_error());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message": "Name is taken"}"#).as_deref(),
            Some("Name is taken")
        );
        assert_eq!(
            error_message(r#"{"error": "Bad token"}"#).as_deref(),
            Some("Bad token")
        );
        assert_eq!(error_message(r#"{"message": "  "}"#), None);
        assert_eq!(error_message("<html>oops</html>"), None);
    }

    #[test]
    fn test_client_records_authentication() {
        let config = ApiConfig::new("http://localhost:8080/api").unwrap();
        assert!(!ApiClient::new(&config).unwrap().is_authenticated());

        let config = config.with_token(secrecy::SecretString::from("tok3n-Zq9!xA"));
        assert!(ApiClient::new(&config).unwrap().is_authenticated());
    }

    #[test]
    fn test_invalid_token_header_is_rejected() {
        let config = ApiConfig::new("http://localhost:8080/api")
            .unwrap()
            .with_token(secrecy::SecretString::from("bad\ntoken"));
        assert!(matches!(
            ApiClient::new(&config),
            Err(ApiError::BadRequest(_))
        ));
    }
}
