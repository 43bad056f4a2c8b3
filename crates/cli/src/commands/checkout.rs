//! Checkout command.

use std::path::Path;

use shopfront_storefront::checkout::{CheckoutForm, place_order};
use shopfront_storefront::tracking::estimated_delivery;
use shopfront_storefront::{AppError, StorefrontConfig};

use super::{Session, read_yaml, render};

/// Place an order for the cart using the details in a YAML file.
///
/// # Errors
///
/// Returns an error if the file is invalid, the cart is empty, or the API
/// rejects the order.
pub async fn run(config: &StorefrontConfig, details: &Path) -> Result<(), AppError> {
    let form: CheckoutForm = read_yaml(details).await?;
    let mut session = Session::open(config).await?;

    render::cart(&session.store);
    let result = place_order(&mut session.store, &session.client, &form).await;
    session.flush_notifications();
    let order_id = result?;

    render::message(&format!("Order #{order_id} placed"));
    if let Ok(order) = session.client.get_order(&order_id).await
        && let Some(created_at) = order.created_at
    {
        let eta = estimated_delivery(created_at, order.shipping_method);
        render::message(&format!("Estimated delivery: {}", eta.format("%B %-d, %Y")));
    }
    render::message(&format!("Track it with: shopfront orders track {order_id}"));
    Ok(())
}
