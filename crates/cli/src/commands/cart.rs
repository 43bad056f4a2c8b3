//! Cart commands.
//!
//! Each command opens a session, applies one change and prints the
//! resulting notifications. The guest cart persists under the data directory
//! between runs.

use shopfront_core::{LineId, NewLine, ProductId};
use shopfront_storefront::{AppError, StorefrontConfig};
use tracing::warn;

use super::{Session, render};

/// Show the cart and its totals.
///
/// # Errors
///
/// Returns an error if the API client cannot be built.
pub async fn show(config: &StorefrontConfig) -> Result<(), AppError> {
    let session = Session::open(config).await?;
    render::cart(&session.store);
    Ok(())
}

/// Add a product, capped to the units in stock.
///
/// # Errors
///
/// Returns an error if the product does not exist, is out of stock, or the
/// cart cannot be updated.
pub async fn add(
    config: &StorefrontConfig,
    product_id: &ProductId,
    quantity: u32,
) -> Result<(), AppError> {
    let mut session = Session::open(config).await?;
    let product = session.client.get_product(product_id).await?;

    if !product.in_stock() {
        return Err(AppError::Input(format!("{} is out of stock", product.name)));
    }

    let capped = product.clamp_quantity(quantity);
    if capped < quantity {
        warn!(requested = quantity, stock = product.stock, "Quantity capped to stock");
        render::warning(&format!("Only {} of {} in stock", product.stock, product.name));
    }

    let result = session.store.add_line(&NewLine::from(&product), capped).await;
    session.flush_notifications();
    result?;

    render::cart(&session.store);
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns an error if the cart cannot be updated.
pub async fn set(config: &StorefrontConfig, line_id: &LineId, quantity: i64) -> Result<(), AppError> {
    let mut session = Session::open(config).await?;
    let result = session.store.set_quantity(line_id, quantity).await;
    session.flush_notifications();
    result?;

    render::cart(&session.store);
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the cart cannot be updated.
pub async fn remove(config: &StorefrontConfig, line_id: &LineId) -> Result<(), AppError> {
    let mut session = Session::open(config).await?;
    let result = session.store.remove_line(line_id).await;
    session.flush_notifications();
    result?;

    render::cart(&session.store);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be cleared.
pub async fn clear(config: &StorefrontConfig) -> Result<(), AppError> {
    let mut session = Session::open(config).await?;
    let result = session.store.clear().await;
    session.flush_notifications();
    Ok(result?)
}
