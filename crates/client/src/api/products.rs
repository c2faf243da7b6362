//! Product catalog.

use reqwest::Method;
use tracing::instrument;

use everything_store_core::ProductId;

use super::conversions::{ProductRecord, convert_product, convert_products};
use super::types::{Acknowledgement, NewProduct, Product};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn get_all_products(&self) -> Result<Vec<Product>, ApiError> {
        let builder = self.request(Method::GET, "/users/productview");
        let records: Option<Vec<ProductRecord>> =
            self.fetch(builder, "Failed to get products").await?;
        convert_products(records)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the product does not exist.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let path = format!("/users/productview/{}", urlencoding::encode(id.as_str()));
        let builder = self.request(Method::GET, &path);
        let record: ProductRecord = self.fetch(builder, "Failed to get product").await?;
        convert_product(record)
    }

    /// Search products by name.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let path = format!("/users/search?name={}", urlencoding::encode(query));
        let builder = self.request(Method::GET, &path);
        let records: Option<Vec<ProductRecord>> =
            self.fetch(builder, "Failed to search products").await?;
        convert_products(records)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the product.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn add_product(&self, product: &NewProduct) -> Result<Acknowledgement, ApiError> {
        let builder = self.request(Method::POST, "/users/productview").json(product);
        self.acknowledge(builder, "Failed to add product").await
    }
}
