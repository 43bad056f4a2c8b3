//! Shopfront Storefront library.
//!
//! Client-side storefront logic: the REST API client, the session cart store
//! with its guest and signed-in backends, checkout and order tracking.
//!
//! # Architecture
//!
//! - [`api`] talks to the storefront REST API (catalog, cart, orders, admin)
//! - [`cart`] owns the session cart and keeps it consistent across sign-in
//! - [`storage`], [`notify`] and [`identity`] are the seams the cart store
//!   depends on; each has a production and an in-memory implementation
//! - [`checkout`] and [`tracking`] build on the cart and order APIs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod identity;
pub mod notify;
pub mod storage;
pub mod telemetry;
pub mod tracking;

pub use api::{ApiClient, ApiError};
pub use cart::{CartError, CartSource, CartStore};
pub use config::StorefrontConfig;
pub use error::AppError;
