//! Order history and tracking commands.

use shopfront_core::OrderId;
use shopfront_storefront::tracking::{OrderTimeline, estimated_delivery};
use shopfront_storefront::{AppError, ApiClient, StorefrontConfig};

use super::render;

/// List the shopper's orders with a summary.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn list(config: &StorefrontConfig, limit: Option<u32>) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    let orders = client.list_orders(limit).await?;
    render::orders(&orders);
    Ok(())
}

/// Show one order.
///
/// # Errors
///
/// Returns an error if the order does not exist.
pub async fn show(config: &StorefrontConfig, id: &OrderId) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    let order = client.get_order(id).await?;
    render::order(&order);
    Ok(())
}

/// Show the tracking timeline for an order.
///
/// # Errors
///
/// Returns an error if the order or its tracking cannot be fetched.
pub async fn track(config: &StorefrontConfig, id: &OrderId) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    let (order, tracking) = tokio::try_join!(client.get_order(id), client.track_order(id))?;

    let timeline = OrderTimeline::new(&order.status, &tracking);
    let estimated = order
        .created_at
        .map(|at| estimated_delivery(at, order.shipping_method));

    render::order(&order);
    render::message("");
    render::timeline(&timeline, estimated);
    Ok(())
}

/// Cancel a pending order.
///
/// # Errors
///
/// Returns an error if the order is past `Pending` or the API refuses.
pub async fn cancel(config: &StorefrontConfig, id: &OrderId) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    client.cancel_order(id).await?;
    render::message(&format!("Order #{id} cancelled"));
    Ok(())
}
