//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types used across all Shopfront components:
//! - `storefront` - API client, cart store, checkout and order tracking
//! - `cli` - Terminal front end for browsing, cart and orders
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`cart`] - Cart lines and the cart collection invariants
//! - [`totals`] - Derived cart totals (subtotal, shipping, tax, grand total)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod totals;
pub mod types;

pub use cart::{Cart, CartLine, NewLine};
pub use totals::Totals;
pub use types::*;
