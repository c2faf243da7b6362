//! Application state: the auth and cart containers plus what they share.

mod auth;
mod cart;

pub use auth::{AuthBackend, AuthError, AuthStore};
pub use cart::{CartBackend, CartError, CartState, CartStore};

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::session::{FileSessionStore, SessionStore};

/// Application state shared by every page.
///
/// This struct is cheaply cloneable via `Arc`. Creating it restores any
/// persisted login, loads that user's cart, and starts the task that keeps
/// the cart in step with the logged-in user.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    api: ApiClient,
    auth: AuthStore<ApiClient>,
    cart: CartStore<ApiClient>,
}

impl AppState {
    /// Create application state with the marker at `config.session_file`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn new(config: ClientConfig) -> Result<Self, AppError> {
        let sessions = Arc::new(FileSessionStore::new(&config.session_file));
        Self::with_session_store(config, sessions).await
    }

    /// Create application state with a custom marker store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn with_session_store(
        config: ClientConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, AppError> {
        let api = ApiClient::new(&config.api)?;
        let auth = AuthStore::new(api.clone(), sessions);
        let cart = CartStore::new(api.clone(), auth.subscribe());

        if let Some(user) = auth.restore() {
            info!(user_id = %user.id, "Loading cart for restored session");
            cart.refresh().await;
        }
        tokio::spawn(cart.clone().follow_auth());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                auth,
                cart,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the authentication store.
    #[must_use]
    pub fn auth(&self) -> &AuthStore<ApiClient> {
        &self.inner.auth
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore<ApiClient> {
        &self.inner.cart
    }

    /// Log out and empty the cart before returning. No request is made.
    pub fn logout(&self) {
        self.inner.auth.logout();
        self.inner.cart.clear();
    }
}
