//! Order placement, history, tracking and cancellation.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::{info, instrument};

use shopfront_core::OrderId;

use super::{ApiClient, ApiError, Order, OrderListQuery, OrderRequest, TrackingInfo};
use crate::checkout::OrderService;

/// Response body of `POST orders`.
#[derive(Debug, Deserialize)]
struct CreatedOrder {
    id: OrderId,
}

impl ApiClient {
    /// Place an order and return its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderId, ApiError> {
        let request = self.request(Method::POST, "orders")?.json(order);
        let created: CreatedOrder = self.send_json(request, "orders").await?;
        info!(order_id = %created.id, "Order created");
        Ok(created.id)
    }

    /// List the shopper's orders, newest first as returned by the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, limit: Option<u32>) -> Result<Vec<Order>, ApiError> {
        let request = self
            .request(Method::GET, "orders")?
            .query(&OrderListQuery { limit });
        self.send_json(request, "orders").await
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        let request = self.request(Method::GET, &format!("orders/{id}"))?;
        self.send_json(request, &format!("order {id}")).await
    }

    /// Get shipment events for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn track_order(&self, id: &OrderId) -> Result<TrackingInfo, ApiError> {
        let request = self.request(Method::GET, &format!("orders/{id}/tracking"))?;
        self.send_json(request, &format!("tracking for order {id}"))
            .await
    }

    /// Cancel a pending order.
    ///
    /// The current status is checked first; orders past `Pending` are
    /// refused without calling the cancel route.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if the order can no longer be cancelled,
    /// or an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: &OrderId) -> Result<(), ApiError> {
        let order = self.get_order(id).await?;
        if !order.status.is_cancellable() {
            return Err(ApiError::BadRequest(format!(
                "Order {id} is {} and can no longer be cancelled",
                order.status.label()
            )));
        }

        let request = self.request(Method::PUT, &format!("orders/{id}/cancel"))?;
        self.send_empty(request, &format!("order {id}")).await?;
        info!("Order cancelled");
        Ok(())
    }
}

#[async_trait]
impl OrderService for ApiClient {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderId, ApiError> {
        Self::create_order(self, order).await
    }
}
