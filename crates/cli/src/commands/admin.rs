//! Store administration commands.
//!
//! Requires `SHOPFRONT_API_TOKEN` to belong to an admin account.
//!
//! # Usage
//!
//! ```bash
//! shopfront admin stats
//! shopfront admin create-product --file mug.yaml
//! shopfront admin update-product 42 --file mug.yaml
//! shopfront admin delete-product 42
//! ```

use std::path::Path;

use shopfront_core::ProductId;
use shopfront_storefront::api::ProductInput;
use shopfront_storefront::{AppError, ApiClient, StorefrontConfig};
use tracing::info;

use super::{read_yaml, render};

/// Show dashboard counters.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn stats(config: &StorefrontConfig) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    let stats = client.dashboard_stats().await?;
    render::stats(&stats);
    Ok(())
}

/// Create a product from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is invalid or the API rejects the product.
pub async fn create_product(config: &StorefrontConfig, file: &Path) -> Result<(), AppError> {
    let input: ProductInput = read_yaml(file).await?;
    let client = ApiClient::new(&config.api)?;

    info!(name = %input.name, "Creating product");
    let product = client.create_product(&input).await?;
    render::message("Product created successfully!");
    render::product(&product);
    Ok(())
}

/// Replace a product's fields from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is invalid or the API rejects the update.
pub async fn update_product(
    config: &StorefrontConfig,
    id: &ProductId,
    file: &Path,
) -> Result<(), AppError> {
    let input: ProductInput = read_yaml(file).await?;
    let client = ApiClient::new(&config.api)?;

    let product = client.update_product(id, &input).await?;
    render::message("Product updated successfully!");
    render::product(&product);
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns an error if the product does not exist.
pub async fn delete_product(config: &StorefrontConfig, id: &ProductId) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    client.delete_product(id).await?;
    render::message(&format!("Product {id} deleted"));
    Ok(())
}
