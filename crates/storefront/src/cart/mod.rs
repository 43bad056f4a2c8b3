//! Session cart store.
//!
//! [`CartStore`] owns the one visible cart of a session and keeps it
//! consistent across sign-in and sign-out. Every mutation goes through exactly
//! one backend, picked from the authentication state when the call starts:
//!
//! - guest: the cart lives in the local store under `guest_cart`
//! - signed in: the API owns the cart and every mutation is followed by a
//!   re-fetch, so the server's view always wins
//!
//! A failed remote call leaves the in-memory cart untouched. Outcomes are
//! reported to the [`NotificationSink`] as the shopper-facing toasts.
//!
//! # Example
//!
//! ```rust,ignore
//! let (mut store, source) = CartStore::open(remote, local, notifier, auth).await;
//! store.add_line(&NewLine::from(&product), 2).await?;
//! println!("{}", store.totals().grand_total);
//! ```

mod backend;
mod busy;

pub use backend::{CartBackend, LocalBackend, RemoteBackend, RemoteCartService};
pub use busy::BusyFlag;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use shopfront_core::{Cart, LineId, NewLine, ProductId, Totals};

use crate::api::ApiError;
use crate::error::add_breadcrumb;
use crate::identity::AuthSignal;
use crate::notify::{Notification, NotificationSink};
use crate::storage::LocalStore;

/// Errors surfaced by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The API call failed; the cart was left as it was.
    #[error("Remote cart error: {0}")]
    Remote(#[from] ApiError),
}

/// Where the visible cart came from after [`CartStore::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartSource {
    /// The signed-in shopper's server cart.
    Remote,
    /// The guest cart from the local store.
    Guest,
    /// Signed in, but the server cart could not be fetched, so the guest cart
    /// is shown instead.
    GuestFallback,
}

/// The session's cart and its derived totals.
pub struct CartStore {
    remote: Arc<dyn RemoteCartService>,
    local: LocalBackend,
    notifier: Arc<dyn NotificationSink>,
    auth: AuthSignal,
    cart: Cart,
    totals: Totals,
    busy: BusyFlag,
}

impl CartStore {
    /// Create a store with an empty cart. Call [`Self::initialize`] before use,
    /// or use [`Self::open`].
    pub fn new(
        remote: Arc<dyn RemoteCartService>,
        local: Arc<dyn LocalStore>,
        notifier: Arc<dyn NotificationSink>,
        auth: AuthSignal,
    ) -> Self {
        Self {
            remote,
            local: LocalBackend::new(local),
            notifier,
            auth,
            cart: Cart::new(),
            totals: Totals::default(),
            busy: BusyFlag::new(),
        }
    }

    /// Create a store and load the cart for the current authentication state.
    pub async fn open(
        remote: Arc<dyn RemoteCartService>,
        local: Arc<dyn LocalStore>,
        notifier: Arc<dyn NotificationSink>,
        auth: AuthSignal,
    ) -> (Self, CartSource) {
        let mut store = Self::new(remote, local, notifier, auth);
        let source = store.initialize().await;
        (store, source)
    }

    /// End the session and return the last cart.
    #[must_use]
    pub fn close(self) -> Cart {
        debug!(lines = self.cart.len(), "Cart store closed");
        self.cart
    }

    // =========================================================================
    // Read access
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Quantity of a product in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.cart.quantity_of(product_id)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// A handle that observes the busy flag from elsewhere.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Load the cart for the current authentication state.
    ///
    /// Signed in, the server cart replaces whatever was visible. If it cannot
    /// be fetched, the guest cart is shown and [`CartSource::GuestFallback`]
    /// is returned.
    #[instrument(skip(self), fields(authenticated = self.auth.is_authenticated()))]
    pub async fn initialize(&mut self) -> CartSource {
        let _busy = self.busy.acquire();

        let (cart, source) = if self.auth.is_authenticated() {
            match self.remote.fetch_cart().await {
                Ok(cart) => (cart, CartSource::Remote),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch server cart, showing guest cart");
                    (self.local.load(), CartSource::GuestFallback)
                }
            }
        } else {
            (self.local.load(), CartSource::Guest)
        };

        info!(source = ?source, lines = cart.len(), "Cart loaded");
        self.commit(cart);
        source
    }

    /// Wait for the next authentication change and reload the cart.
    ///
    /// Returns `None` once the identity provider is gone.
    pub async fn follow_identity(&mut self) -> Option<CartSource> {
        let authenticated = self.auth.changed().await?;
        add_breadcrumb(
            "auth",
            if authenticated { "Signed in" } else { "Signed out" },
            None,
        );
        Some(self.initialize().await)
    }

    /// Re-read the cart from the active backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cart cannot be fetched; the visible cart
    /// is left as it was.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), CartError> {
        let _busy = self.busy.acquire();
        let cart = self.backend().fetch().await?;
        self.commit(cart);
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a product.
    ///
    /// A quantity of 0 does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the change.
    #[instrument(skip(self, line), fields(product_id = %line.product_id))]
    pub async fn add_line(&mut self, line: &NewLine, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            debug!("Ignoring add with zero quantity");
            return Ok(());
        }

        let _busy = self.busy.acquire();
        let backend = self.backend();
        let result = backend.add(&self.cart, line, quantity).await;
        match result {
            Ok(cart) => {
                self.commit(cart);
                let qty = quantity.to_string();
                add_breadcrumb(
                    "cart",
                    "Added item",
                    Some(&[("product_id", line.product_id.as_str()), ("quantity", qty.as_str())]),
                );
                self.notify(Notification::success(format!("{} added to cart!", line.name)));
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to add item to cart")),
        }
    }

    /// Set a line's quantity. A quantity of 0 or less removes the line.
    ///
    /// Quantities beyond `u32::MAX` are capped. Unknown line IDs do nothing
    /// on the guest cart; signed in, the call always reaches the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the change.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn set_quantity(&mut self, id: &LineId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_line(id).await;
        }
        let backend = self.backend();
        if !backend.is_remote() && self.cart.line(id).is_none() {
            debug!("Ignoring update for unknown guest line");
            return Ok(());
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let _busy = self.busy.acquire();
        let result = backend.set_quantity(&self.cart, id, quantity).await;
        match result {
            Ok(cart) => {
                self.commit(cart);
                let qty = quantity.to_string();
                add_breadcrumb(
                    "cart",
                    "Updated quantity",
                    Some(&[("line_id", id.as_str()), ("quantity", qty.as_str())]),
                );
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to update item quantity")),
        }
    }

    /// Remove a line. Unknown line IDs do nothing on the guest cart; signed
    /// in, the call always reaches the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the change.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn remove_line(&mut self, id: &LineId) -> Result<(), CartError> {
        let backend = self.backend();
        if !backend.is_remote() && self.cart.line(id).is_none() {
            debug!("Ignoring removal of unknown guest line");
            return Ok(());
        }

        let _busy = self.busy.acquire();
        let result = backend.remove(&self.cart, id).await;
        match result {
            Ok(cart) => {
                self.commit(cart);
                add_breadcrumb("cart", "Removed item", Some(&[("line_id", id.as_str())]));
                self.notify(Notification::success("Item removed from cart"));
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to remove item from cart")),
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the change.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), CartError> {
        let _busy = self.busy.acquire();
        let backend = self.backend();
        let result = backend.clear().await;
        match result {
            Ok(cart) => {
                self.commit(cart);
                add_breadcrumb("cart", "Cleared cart", None);
                self.notify(Notification::success("Cart cleared"));
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to clear cart")),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn backend(&self) -> CartBackend {
        if self.auth.is_authenticated() {
            CartBackend::Remote(RemoteBackend::new(Arc::clone(&self.remote)))
        } else {
            CartBackend::Local(self.local.clone())
        }
    }

    fn commit(&mut self, cart: Cart) {
        self.totals = cart.totals();
        self.cart = cart;
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    fn fail(&self, error: ApiError, message: &str) -> CartError {
        warn!(error = %error, "{message}");
        self.notify(Notification::error(message));
        CartError::Remote(error)
    }
}
