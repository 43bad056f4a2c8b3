//! Admin dashboard and product management.
//!
//! Product writes are validated locally before they are sent and invalidate
//! the catalog cache on success.

use reqwest::Method;
use tracing::{info, instrument};

use shopfront_core::ProductId;

use super::{ApiClient, ApiError, DashboardStats, Product, ProductInput};

impl ApiClient {
    /// Fetch store-wide counters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admin tokens.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let request = self.request(Method::GET, "admin/stats")?;
        self.send_json(request, "admin stats").await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if the input fails validation, or an
    /// error carrying the server's message if the API rejects it.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        validate(input)?;

        let request = self.request(Method::POST, "products")?.json(input);
        let product: Product = self.send_json(request, "products").await?;

        self.invalidate_product(&product.id).await;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if the input fails validation, or
    /// `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        validate(input)?;

        let request = self
            .request(Method::PUT, &format!("products/{id}"))?
            .json(input);
        let product: Product = self.send_json(request, &format!("product {id}")).await?;

        self.invalidate_product(id).await;
        info!("Product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("products/{id}"))?;
        self.send_empty(request, &format!("product {id}")).await?;

        self.invalidate_product(id).await;
        info!("Product deleted");
        Ok(())
    }
}

fn validate(input: &ProductInput) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|errors| ApiError::BadRequest(errors.to_string()))
}
