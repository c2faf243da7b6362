//! HTTP plumbing shared by every resource method.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use everything_store_core::SessionToken;

use super::ApiError;
use super::conversions::convert_acknowledgement;
use super::types::Acknowledgement;
use crate::config::ApiConfig;

/// Header carrying the persisted session token.
const TOKEN_HEADER: &str = "token";

/// Longest response body excerpt written to the log.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the store backend.
///
/// Cheap to clone; clones share the cookie jar and the session token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SessionToken>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("has_token", &self.has_session_token())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("everything-store/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                token: RwLock::new(None),
            }),
        })
    }

    /// Backend base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Replace the token sent with every request. `None` stops sending it.
    pub fn set_session_token(&self, token: Option<SessionToken>) {
        let token = token.filter(|t| !t.is_empty());
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Whether a session token is currently attached to requests.
    #[must_use]
    pub fn has_session_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Start a request to `path` (which must begin with `/`).
    pub(super) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let builder = self.inner.client.request(method, url);

        let token = self
            .inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.expose().to_string());

        match token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    ///
    /// A non-success status becomes [`ApiError::Status`] with the message
    /// taken from the body, or `fallback`.
    pub(super) async fn send(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %truncate(&body),
                "Store API returned non-success status"
            );
            return Err(ApiError::from_response(status, &body, fallback));
        }

        debug!(status = %status, bytes = body.len(), "Store API response");
        Ok(body)
    }

    /// Send a request and parse the JSON body into `T`.
    pub(super) async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let body = self.send(request, fallback).await?;

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse Store API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a write request and reduce its body to an [`Acknowledgement`].
    pub(super) async fn acknowledge(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<Acknowledgement, ApiError> {
        let body = self.send(request, fallback).await?;
        convert_acknowledgement(&body)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
