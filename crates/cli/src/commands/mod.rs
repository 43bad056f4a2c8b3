//! CLI command implementations.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use shopfront_storefront::identity::IdentityProvider;
use shopfront_storefront::notify::CollectingSink;
use shopfront_storefront::storage::FileStore;
use shopfront_storefront::{AppError, ApiClient, CartSource, CartStore, StorefrontConfig};

/// A cart session for one command.
///
/// The session counts as signed in when an API token is configured.
pub struct Session {
    pub client: ApiClient,
    pub store: CartStore,
    sink: Arc<CollectingSink>,
    _identity: IdentityProvider,
}

impl Session {
    /// Connect to the API and load the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub async fn open(config: &StorefrontConfig) -> Result<Self, AppError> {
        let client = ApiClient::new(&config.api)?;
        let identity = IdentityProvider::new(client.is_authenticated());
        let sink = Arc::new(CollectingSink::new());

        let (store, source) = CartStore::open(
            Arc::new(client.clone()),
            Arc::new(FileStore::new(&config.data_dir)),
            sink.clone(),
            identity.signal(),
        )
        .await;
        tracing::debug!(source = ?source, "Session opened");
        if source == CartSource::GuestFallback {
            render::warning("Could not load your account cart; showing the cart saved on this device");
        }

        Ok(Self {
            client,
            store,
            sink,
            _identity: identity,
        })
    }

    /// Print the notifications collected so far.
    pub fn flush_notifications(&self) {
        for notification in self.sink.drain() {
            render::notification(&notification);
        }
    }
}

/// Read and decode a YAML input file.
///
/// # Errors
///
/// Returns `AppError::Input` if the file cannot be read or decoded.
pub async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Input(format!("{}: {e}", path.display())))?;
    serde_yaml::from_str(&content).map_err(|e| AppError::Input(format!("{}: {e}", path.display())))
}
