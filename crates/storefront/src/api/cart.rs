//! Server-side cart of the signed-in shopper.
//!
//! Never cached: every mutation is followed by a fresh fetch in the cart
//! store.

use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;

use shopfront_core::{Cart, LineId, ProductId};

use super::{AddItemRequest, ApiClient, ApiError, CartResponse, UpdateItemRequest};
use crate::cart::RemoteCartService;

impl ApiClient {
    /// Fetch the shopper's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        let request = self.request(Method::GET, "cart")?;
        let response: CartResponse = self.send_json(request, "cart").await?;
        Ok(response.items)
    }

    /// Add `quantity` units of a product to the shopper's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_cart_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = AddItemRequest {
            product_id: product_id.clone(),
            quantity,
        };
        let request = self.request(Method::POST, "cart/items")?.json(&body);
        self.send_empty(request, "cart").await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_cart_item(&self, line_id: &LineId, quantity: u32) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &format!("cart/items/{line_id}"))?
            .json(&UpdateItemRequest { quantity });
        self.send_empty(request, &format!("cart item {line_id}"))
            .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_cart_item(&self, line_id: &LineId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("cart/items/{line_id}"))?;
        self.send_empty(request, &format!("cart item {line_id}"))
            .await
    }

    /// Empty the shopper's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, "cart")?;
        self.send_empty(request, "cart").await
    }
}

#[async_trait]
impl RemoteCartService for ApiClient {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        Self::fetch_cart(self).await
    }

    async fn add_item(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        self.add_cart_item(product_id, quantity).await
    }

    async fn update_item(&self, line_id: &LineId, quantity: u32) -> Result<(), ApiError> {
        self.update_cart_item(line_id, quantity).await
    }

    async fn remove_item(&self, line_id: &LineId) -> Result<(), ApiError> {
        self.remove_cart_item(line_id).await
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        Self::clear_cart(self).await
    }
}
