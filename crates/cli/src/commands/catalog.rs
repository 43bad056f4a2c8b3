//! Catalog browsing commands.

use shopfront_core::ProductId;
use shopfront_storefront::api::ProductQuery;
use shopfront_storefront::{AppError, ApiClient, StorefrontConfig};

use super::render;

/// List products matching the filters.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn products(config: &StorefrontConfig, query: &ProductQuery) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    let products = client.list_products(query).await?;
    tracing::debug!(count = products.len(), "Fetched products");
    render::products(&products);
    Ok(())
}

/// Show one product.
///
/// # Errors
///
/// Returns an error if the product does not exist.
pub async fn product(config: &StorefrontConfig, id: &ProductId) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    let product = client.get_product(id).await?;
    render::product(&product);
    Ok(())
}

/// List categories.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn categories(config: &StorefrontConfig) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    let categories = client.list_categories().await?;
    render::categories(&categories);
    Ok(())
}
