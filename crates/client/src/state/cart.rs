//! Cart state: the local view of the server-side cart.
//!
//! # Mutation contract
//!
//! Every mutation sets `loading`, clears the previous error, makes its call,
//! then re-fetches the whole cart whether the call succeeded or not. Items are
//! never patched locally. A failed call records its message in
//! [`CartState::error`] and is returned to the caller; `loading` is cleared at
//! the end either way.
//!
//! Totals are computed from `items` on every read and never stored.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use everything_store_core::{Price, ProductId};

use crate::api::{Acknowledgement, ApiClient, ApiError, CartItem, User};
use crate::error::add_breadcrumb;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product ID is required")]
    MissingProduct,
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("Please log in to use the cart")]
    NotAuthenticated,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Backend calls the cart store depends on.
pub trait CartBackend: Send + Sync {
    async fn get_cart(&self) -> Result<Vec<CartItem>, ApiError>;
    async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Acknowledgement, ApiError>;
    async fn remove_from_cart(&self, product_id: &ProductId)
    -> Result<Acknowledgement, ApiError>;
    async fn checkout(&self) -> Result<Acknowledgement, ApiError>;
    async fn buy_products(&self) -> Result<Acknowledgement, ApiError>;
}

impl CartBackend for ApiClient {
    async fn get_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        Self::get_cart(self).await
    }

    async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Acknowledgement, ApiError> {
        Self::add_to_cart(self, product_id, quantity).await
    }

    async fn remove_from_cart(
        &self,
        product_id: &ProductId,
    ) -> Result<Acknowledgement, ApiError> {
        Self::remove_from_cart(self, product_id).await
    }

    async fn checkout(&self) -> Result<Acknowledgement, ApiError> {
        Self::checkout(self).await
    }

    async fn buy_products(&self) -> Result<Acknowledgement, ApiError> {
        Self::buy_products(self).await
    }
}

// =============================================================================
// CartState
// =============================================================================

/// Snapshot of the cart as last fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub items: Vec<CartItem>,
    /// A mutation or refresh is in flight.
    pub loading: bool,
    /// Message of the last failed operation.
    pub error: Option<String>,
}

impl CartState {
    /// Sum of quantities, saturating at `u32::MAX`.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |total, item| total.saturating_add(item.quantity))
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// CartStore
// =============================================================================

/// Authoritative local view of the current user's cart.
pub struct CartStore<B> {
    inner: Arc<CartStoreInner<B>>,
}

struct CartStoreInner<B> {
    backend: B,
    auth: watch::Receiver<Option<User>>,
    state: watch::Sender<CartState>,
}

impl<B> Clone for CartStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: CartBackend> CartStore<B> {
    /// Create an empty cart that follows the identity published on `auth`.
    #[must_use]
    pub fn new(backend: B, auth: watch::Receiver<Option<User>>) -> Self {
        let (state, _) = watch::channel(CartState::default());
        Self {
            inner: Arc::new(CartStoreInner {
                backend,
                auth,
                state,
            }),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that sees every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.inner.state.borrow().total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.inner.state.borrow().total_price()
    }

    fn is_authenticated(&self) -> bool {
        self.inner.auth.borrow().is_some()
    }

    /// Drop every item and any error. No request is made.
    pub fn clear(&self) {
        self.inner.state.send_replace(CartState::default());
    }

    /// Replace local state with the backend's cart.
    ///
    /// Without a user this only clears. Failures are kept in
    /// [`CartState::error`], never returned.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        if !self.is_authenticated() {
            self.clear();
            return;
        }

        self.begin();
        let error = self.sync().await;
        self.finish(error);
    }

    /// Add `quantity` of a product, then re-sync.
    ///
    /// # Errors
    ///
    /// Returns `MissingProduct` or `InvalidQuantity` before any request,
    /// `NotAuthenticated` without a user, or the backend's error.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn add_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Acknowledgement, CartError> {
        if product_id.is_empty() {
            return Err(CartError::MissingProduct);
        }
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        self.ensure_authenticated()?;

        let quantity_text = quantity.to_string();
        add_breadcrumb(
            "cart",
            "add_item",
            Some(&[
                ("product_id", product_id.as_str()),
                ("quantity", quantity_text.as_str()),
            ]),
        );
        self.mutate(self.inner.backend.add_to_cart(product_id, quantity))
            .await
    }

    /// Add a single unit of a product.
    ///
    /// # Errors
    ///
    /// Same as [`add_item`](Self::add_item).
    pub async fn add_one(&self, product_id: &ProductId) -> Result<Acknowledgement, CartError> {
        self.add_item(product_id, 1).await
    }

    /// Remove a product's whole line, then re-sync.
    ///
    /// # Errors
    ///
    /// Returns `MissingProduct` before any request, `NotAuthenticated`
    /// without a user, or the backend's error.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<Acknowledgement, CartError> {
        if product_id.is_empty() {
            return Err(CartError::MissingProduct);
        }
        self.ensure_authenticated()?;

        add_breadcrumb(
            "cart",
            "remove_item",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.mutate(self.inner.backend.remove_from_cart(product_id))
            .await
    }

    /// Place an order for the cart, then re-sync.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a user, or the backend's error.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Acknowledgement, CartError> {
        self.ensure_authenticated()?;
        add_breadcrumb("cart", "checkout", None);
        self.mutate(self.inner.backend.checkout()).await
    }

    /// Buy the cart contents immediately, then re-sync.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a user, or the backend's error.
    #[instrument(skip(self))]
    pub async fn buy_now(&self) -> Result<Acknowledgement, CartError> {
        self.ensure_authenticated()?;
        add_breadcrumb("cart", "buy_now", None);
        self.mutate(self.inner.backend.buy_products()).await
    }

    /// React to an identity change: clear on logout, re-fetch on login.
    pub async fn apply_auth(&self, user: Option<&User>) {
        match user {
            Some(user) => {
                debug!(user_id = %user.id, "Identity present, refreshing cart");
                self.refresh().await;
            }
            None => {
                debug!("Identity absent, clearing cart");
                self.clear();
            }
        }
    }

    /// Apply every later identity change until the auth store goes away.
    ///
    /// The identity current at the time of the call is treated as already
    /// applied.
    pub async fn follow_auth(self) {
        let mut auth = self.inner.auth.clone();
        auth.borrow_and_update();

        while auth.changed().await.is_ok() {
            let user = auth.borrow_and_update().clone();
            self.apply_auth(user.as_ref()).await;
        }
        debug!("Auth store dropped, cart stops following");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_authenticated(&self) -> Result<(), CartError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(CartError::NotAuthenticated)
        }
    }

    fn begin(&self) {
        self.inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
    }

    fn finish(&self, error: Option<String>) {
        self.inner.state.send_modify(|state| {
            state.loading = false;
            state.error = error;
        });
    }

    async fn mutate(
        &self,
        call: impl Future<Output = Result<Acknowledgement, ApiError>>,
    ) -> Result<Acknowledgement, CartError> {
        self.begin();
        let result = call.await;
        let refresh_error = self.sync().await;

        let error = match &result {
            Ok(_) => refresh_error,
            Err(e) => {
                warn!(error = %e, "Cart operation failed");
                Some(e.to_string())
            }
        };
        self.finish(error);

        result.map_err(CartError::from)
    }

    /// Fetch the cart and replace `items`. Returns the failure message.
    async fn sync(&self) -> Option<String> {
        match self.inner.backend.get_cart().await {
            Ok(items) => {
                // A logout that raced the fetch wins.
                if self.is_authenticated() {
                    self.inner.state.send_modify(|state| state.items = items);
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh cart");
                Some(e.to_string())
            }
        }
    }
}
