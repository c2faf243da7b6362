//! Authentication state: who is logged in.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use everything_store_core::SessionToken;

use crate::api::{
    Acknowledgement, ApiClient, ApiError, Credentials, LoginSession, SignupRequest, User,
};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::session::{SessionMarker, SessionStore};

/// Errors from login and signup.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Backend calls the auth store depends on.
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginSession, ApiError>;
    async fn signup(&self, request: &SignupRequest) -> Result<Acknowledgement, ApiError>;
    /// Attach (or stop attaching) the session token to later requests.
    fn set_session_token(&self, token: Option<SessionToken>);
}

impl AuthBackend for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginSession, ApiError> {
        Self::login(self, credentials).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<Acknowledgement, ApiError> {
        Self::signup(self, request).await
    }

    fn set_session_token(&self, token: Option<SessionToken>) {
        Self::set_session_token(self, token);
    }
}

// =============================================================================
// AuthStore
// =============================================================================

/// Single source of truth for the current user.
///
/// Every change of identity is published on a watch channel; see
/// [`AuthStore::subscribe`].
pub struct AuthStore<B> {
    inner: Arc<AuthStoreInner<B>>,
}

struct AuthStoreInner<B> {
    backend: B,
    sessions: Arc<dyn SessionStore>,
    user: watch::Sender<Option<User>>,
}

impl<B> Clone for AuthStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: AuthBackend> AuthStore<B> {
    /// Create a logged-out store. Call [`restore`](Self::restore) to pick up
    /// a previous login.
    #[must_use]
    pub fn new(backend: B, sessions: Arc<dyn SessionStore>) -> Self {
        let (user, _) = watch::channel(None);
        Self {
            inner: Arc::new(AuthStoreInner {
                backend,
                sessions,
                user,
            }),
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner.user.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.user.borrow().is_some()
    }

    /// Receiver that sees every login and logout.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.inner.user.subscribe()
    }

    /// Re-establish identity from the persisted marker.
    ///
    /// A marker that cannot be read is logged and removed; the store then
    /// stays logged out.
    pub fn restore(&self) -> Option<User> {
        let marker = match self.inner.sessions.load() {
            Ok(marker) => marker?,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session marker");
                if let Err(e) = self.inner.sessions.clear() {
                    warn!(error = %e, "Failed to remove session marker");
                }
                return None;
            }
        };

        info!(user_id = %marker.user.id, "Restored session");
        self.authenticate(marker.user.clone(), marker.token);
        Some(marker.user)
    }

    /// Log in. On failure the previous state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the credentials or is unreachable.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let LoginSession { user, token } = self.inner.backend.login(credentials).await?;

        let marker = SessionMarker::new(user.clone(), token.clone());
        if let Err(e) = self.inner.sessions.save(&marker) {
            warn!(error = %e, "Failed to persist session marker");
        }

        info!(user_id = %user.id, "Logged in");
        self.authenticate(user.clone(), token);
        Ok(user)
    }

    /// Create an account. Does not log in; any token in the response is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the signup or is unreachable.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<Acknowledgement, AuthError> {
        let ack = self.inner.backend.signup(request).await?;
        info!("Signed up");
        Ok(Acknowledgement {
            message: ack.message,
            token: None,
        })
    }

    /// Forget the current user. Local only; no request is made.
    pub fn logout(&self) {
        self.inner.backend.set_session_token(None);
        if let Err(e) = self.inner.sessions.clear() {
            warn!(error = %e, "Failed to remove session marker");
        }
        clear_sentry_user();

        let previous = self.inner.user.send_replace(None);
        if let Some(user) = previous {
            info!(user_id = %user.id, "Logged out");
        }
    }

    fn authenticate(&self, user: User, token: Option<SessionToken>) {
        self.inner.backend.set_session_token(token);
        set_sentry_user(&user.id, Some(user.email.as_str()));
        self.inner.user.send_replace(Some(user));
    }
}
