//! Catalog reads: products and categories.
//!
//! Listings without free-text search, single products and the category list
//! are cached for the configured TTL. Admin writes invalidate them.

use reqwest::Method;
use tracing::{debug, instrument};

use shopfront_core::ProductId;

use super::cache::{self, CacheValue};
use super::{ApiClient, ApiError, Category, Product, ProductQuery};

impl ApiClient {
    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let cacheable = !query.is_search();
        let cache_key = cache::products_key(&serde_json::to_string(query)?);

        // Check cache (only for queries without search)
        if cacheable
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let request = self.request(Method::GET, "products")?.query(query);
        let products: Vec<Product> = self.send_json(request, "products").await?;

        if cacheable {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = cache::product_key(id.as_str());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = self.request(Method::GET, &format!("products/{id}"))?;
        let product: Product = self
            .send_json(request, &format!("product {id}"))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(cache::CATEGORIES_KEY).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let request = self.request(Method::GET, "categories")?;
        let categories: Vec<Category> = self.send_json(request, "categories").await?;

        self.inner
            .cache
            .insert(
                cache::CATEGORIES_KEY.to_string(),
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product and every cached listing.
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.inner
            .cache
            .invalidate(&cache::product_key(id.as_str()))
            .await;
        self.invalidate_listings();
        self.inner.cache.run_pending_tasks().await;
    }

    /// Drop every cached product listing.
    fn invalidate_listings(&self) {
        // Only fails if invalidation closures are not enabled on the builder.
        if let Err(e) = self
            .inner
            .cache
            .invalidate_entries_if(|key, _| key.starts_with(cache::PRODUCTS_PREFIX))
        {
            tracing::warn!(error = %e, "Failed to invalidate product listings");
            self.inner.cache.invalidate_all();
        }
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
