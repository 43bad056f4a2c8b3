//! The two places a cart can live.
//!
//! Guest carts are kept in the local store; signed-in carts are owned by the
//! API. Each backend computes the next cart and hands it back; the store
//! commits it only when the call succeeded.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use shopfront_core::{Cart, LineId, NewLine, ProductId};

use crate::api::ApiError;
use crate::storage::{GUEST_CART_KEY, LocalStore, StorageError};

/// Server-side cart operations for a signed-in shopper.
#[async_trait]
pub trait RemoteCartService: Send + Sync {
    async fn fetch_cart(&self) -> Result<Cart, ApiError>;

    async fn add_item(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError>;

    async fn update_item(&self, line_id: &LineId, quantity: u32) -> Result<(), ApiError>;

    async fn remove_item(&self, line_id: &LineId) -> Result<(), ApiError>;

    async fn clear_cart(&self) -> Result<(), ApiError>;
}

/// Backend chosen for one operation.
pub enum CartBackend {
    Local(LocalBackend),
    Remote(RemoteBackend),
}

impl CartBackend {
    /// Current cart as the backend sees it.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote fetch fails. The local backend never
    /// fails.
    pub async fn fetch(&self) -> Result<Cart, ApiError> {
        match self {
            Self::Local(local) => Ok(local.load()),
            Self::Remote(remote) => remote.fetch().await,
        }
    }

    /// Cart after adding `quantity` units of `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn add(&self, current: &Cart, line: &NewLine, quantity: u32) -> Result<Cart, ApiError> {
        match self {
            Self::Local(local) => Ok(local.add(current, line, quantity)),
            Self::Remote(remote) => remote.add(&line.product_id, quantity).await,
        }
    }

    /// Cart after setting a line's quantity. `quantity` is at least 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn set_quantity(
        &self,
        current: &Cart,
        id: &LineId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        match self {
            Self::Local(local) => Ok(local.set_quantity(current, id, quantity)),
            Self::Remote(remote) => remote.set_quantity(id, quantity).await,
        }
    }

    /// Cart after removing a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn remove(&self, current: &Cart, id: &LineId) -> Result<Cart, ApiError> {
        match self {
            Self::Local(local) => Ok(local.remove(current, id)),
            Self::Remote(remote) => remote.remove(id).await,
        }
    }

    /// Empty cart, after clearing the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn clear(&self) -> Result<Cart, ApiError> {
        match self {
            Self::Local(local) => Ok(local.clear()),
            Self::Remote(remote) => remote.clear().await,
        }
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

// =============================================================================
// LocalBackend
// =============================================================================

/// Guest cart persisted in the local store.
///
/// Storage failures are logged and otherwise ignored: an unreadable cart
/// loads as empty and a failed write keeps the in-memory result.
#[derive(Clone)]
pub struct LocalBackend {
    store: Arc<dyn LocalStore>,
}

impl LocalBackend {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// The stored guest cart, empty when missing or unreadable.
    #[must_use]
    pub fn load(&self) -> Cart {
        match self.read() {
            Ok(Some(cart)) => cart,
            Ok(None) => {
                debug!("No stored guest cart");
                Cart::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load guest cart, starting empty");
                Cart::new()
            }
        }
    }

    fn read(&self) -> Result<Option<Cart>, StorageError> {
        let Some(raw) = self.store.read(GUEST_CART_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn persist(&self, cart: &Cart) {
        let result = serde_json::to_string(cart)
            .map_err(StorageError::from)
            .and_then(|raw| self.store.write(GUEST_CART_KEY, &raw));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist guest cart");
        }
    }

    fn add(&self, current: &Cart, line: &NewLine, quantity: u32) -> Cart {
        let next = current.with_added(line, quantity, LineId::generate_local);
        self.persist(&next);
        next
    }

    fn set_quantity(&self, current: &Cart, id: &LineId, quantity: u32) -> Cart {
        let next = current.with_quantity(id, quantity);
        self.persist(&next);
        next
    }

    fn remove(&self, current: &Cart, id: &LineId) -> Cart {
        let next = current.without_line(id);
        self.persist(&next);
        next
    }

    fn clear(&self) -> Cart {
        if let Err(e) = self.store.delete(GUEST_CART_KEY) {
            warn!(error = %e, "Failed to delete guest cart");
        }
        Cart::new()
    }
}

// =============================================================================
// RemoteBackend
// =============================================================================

/// Signed-in cart owned by the API.
///
/// Every mutation is followed by a fresh fetch; the server's cart always wins
/// over local state.
#[derive(Clone)]
pub struct RemoteBackend {
    service: Arc<dyn RemoteCartService>,
}

impl RemoteBackend {
    pub fn new(service: Arc<dyn RemoteCartService>) -> Self {
        Self { service }
    }

    async fn fetch(&self) -> Result<Cart, ApiError> {
        self.service.fetch_cart().await
    }

    async fn add(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, ApiError> {
        self.service.add_item(product_id, quantity).await?;
        self.fetch().await
    }

    async fn set_quantity(&self, id: &LineId, quantity: u32) -> Result<Cart, ApiError> {
        self.service.update_item(id, quantity).await?;
        self.fetch().await
    }

    async fn remove(&self, id: &LineId) -> Result<Cart, ApiError> {
        self.service.remove_item(id).await?;
        self.fetch().await
    }

    async fn clear(&self) -> Result<Cart, ApiError> {
        self.service.clear_cart().await?;
        Ok(Cart::new())
    }
}
