//! Unified error handling with Sentry integration.
//!
//! Every module has its own `thiserror` enum; `AppError` aggregates them for
//! the binary and the page controllers.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::pages::ValidationError;
use crate::session::SessionError;
use crate::state::{AuthError, CartError};

/// Application-level error type for the store client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Login or signup failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Session marker could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Form input was rejected before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A view could not be rendered.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),
}

impl AppError {
    /// Whether this error is worth an error-tracking event.
    ///
    /// User mistakes and backend rejections are expected; transport, parse,
    /// storage and template failures are not.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        match self {
            Self::Api(err) => !matches!(err, ApiError::Status { .. }),
            Self::Auth(AuthError::Api(err)) | Self::Cart(CartError::Api(err)) => {
                !matches!(err, ApiError::Status { .. })
            }
            Self::Config(_) | Self::Session(_) | Self::Render(_) => true,
            Self::Cart(_) | Self::Validation(_) => false,
        }
    }

    /// Report unexpected errors to Sentry and the log.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Store client error"
            );
        }
    }
}

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a user action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "add_item", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_backend_message_passes_through() {
        let err = AppError::from(ApiError::from_response(
            StatusCode::NOT_FOUND,
            r#"{"message":"not found"}"#,
            "Failed to get product",
        ));
        assert_eq!(err.to_string(), "not found");
        assert!(!err.is_unexpected());
    }

    #[test]
    fn test_expected_and_unexpected() {
        assert!(!AppError::from(CartError::NotAuthenticated).is_unexpected());
        assert!(!AppError::from(ValidationError::new("Please enter a valid price")).is_unexpected());
        assert!(AppError::from(ApiError::Decode("bad".to_string())).is_unexpected());
        assert!(
            AppError::from(CartError::Api(ApiError::Decode("bad".to_string()))).is_unexpected()
        );
        assert!(
            AppError::from(AuthError::Api(ApiError::Decode("bad".to_string()))).is_unexpected()
        );
        assert!(
            !AppError::from(AuthError::Api(ApiError::from_response(
                StatusCode::UNAUTHORIZED,
                r#"{"error":"invalid email or password"}"#,
                "Failed to log in",
            )))
            .is_unexpected()
        );
    }
}
