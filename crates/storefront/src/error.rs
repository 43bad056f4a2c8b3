//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends. Server-class failures are
//! captured to Sentry by [`AppError::report`]; [`AppError::user_message`] is the
//! text safe to show the shopper.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storefront API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input file could not be read or decoded.
    #[error("Invalid input: {0}")]
    Input(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The API error underneath, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) | Self::Cart(CartError::Remote(e)) | Self::Checkout(CheckoutError::Order(e)) => {
                Some(e)
            }
            _ => None,
        }
    }

    /// Whether the error is worth capturing to Sentry.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Internal(_) => true,
            Self::Config(_) | Self::Input(_) => false,
            _ => self.api_error().is_some_and(ApiError::is_server_error),
        }
    }

    /// Capture server errors to Sentry and log the error.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        } else {
            tracing::error!(error = %self, "Command failed");
        }
    }

    /// Text safe to show the shopper.
    ///
    /// Internal details are hidden.
    #[must_use]
    pub fn user_message(&self) -> String {
        if let Some(api) = self.api_error() {
            return api_message(api);
        }

        match self {
            Self::Checkout(CheckoutError::Invalid(errors)) => errors.to_string(),
            Self::Checkout(CheckoutError::EmptyCart) => CheckoutError::EmptyCart.to_string(),
            Self::Config(e) => e.to_string(),
            Self::Input(message) => message.clone(),
            _ => "Internal error".to_string(),
        }
    }
}

fn api_message(error: &ApiError) -> String {
    match error {
        ApiError::NotFound(what) => format!("Not found: {what}"),
        ApiError::Unauthorized(_) => "Please sign in to continue".to_string(),
        ApiError::RateLimited(secs) => {
            format!("Too many requests, try again in {secs} seconds")
        }
        ApiError::BadRequest(message) => message.clone(),
        ApiError::Api { status, message } if *status < 500 => message.clone(),
        _ => "External service error".to_string(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
