//! REST API client layer.
//!
//! # Architecture
//!
//! - One async method on [`ApiClient`] per backend operation, grouped by
//!   resource (`auth`, `products`, `cart`, `addresses`)
//! - Backend is source of truth - NO caching, every call hits the network once
//! - No retries, no timeouts, no cancellation: the caller interprets failure
//! - Backend field names are normalized in [`conversions`]; the rest of the
//!   crate only sees [`types`]
//!
//! # Error contract
//!
//! A non-2xx response becomes [`ApiError::Status`]. Its message is the body's
//! `message` field, else its `error` field, else the operation's fallback text
//! ("Failed to get cart", ...). `Display` of that variant is the bare message,
//! so it can be shown to the user as-is.
//!
//! # Example
//!
//! ```rust,ignore
//! use everything_store_client::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let products = client.get_all_products().await?;
//! client.add_to_cart(&products[0].id, 2).await?;
//! let cart = client.get_cart().await?;
//! ```

mod addresses;
mod auth;
mod cart;
mod client;
pub mod conversions;
mod products;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Human-readable message extracted from the body.
        message: String,
    },

    /// Success body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Success body was JSON but not the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-success response.
    ///
    /// `body` is parsed as JSON when possible; the first non-blank string in
    /// `message` or `error` wins, otherwise `fallback` is used.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str, fallback: &str) -> Self {
        Self::Status {
            status,
            message: extract_message(body).unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// HTTP status of a backend rejection, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the request as unauthenticated.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"].into_iter().find_map(|key| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
    })
}
