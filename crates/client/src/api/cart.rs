//! Cart and order completion.

use reqwest::Method;
use tracing::instrument;

use everything_store_core::ProductId;

use super::conversions::{CartItemRecord, convert_cart};
use super::types::{Acknowledgement, CartItem};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch the current user's cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let builder = self.request(Method::GET, "/cart");
        let records: Option<Vec<CartItemRecord>> =
            self.fetch(builder, "Failed to get cart").await?;
        convert_cart(records)
    }

    /// Add `quantity` of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Acknowledgement, ApiError> {
        let path = format!(
            "/cart/add/{}?quantity={quantity}",
            urlencoding::encode(product_id.as_str())
        );
        let builder = self.request(Method::GET, &path);
        self.acknowledge(builder, "Failed to add to cart").await
    }

    /// Remove a product's whole line from the cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        product_id: &ProductId,
    ) -> Result<Acknowledgement, ApiError> {
        let path = format!("/cart/remove/{}", urlencoding::encode(product_id.as_str()));
        let builder = self.request(Method::GET, &path);
        self.acknowledge(builder, "Failed to remove from cart").await
    }

    /// Turn the cart into an order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Acknowledgement, ApiError> {
        let builder = self.request(Method::GET, "/cart/checkout");
        self.acknowledge(builder, "Failed to checkout").await
    }

    /// Immediate purchase of the cart contents.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn buy_products(&self) -> Result<Acknowledgement, ApiError> {
        let builder = self.request(Method::GET, "/users/productview/buy");
        self.acknowledge(builder, "Failed to buy products").await
    }
}
