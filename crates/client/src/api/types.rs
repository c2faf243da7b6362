//! Client-facing shapes of backend resources.
//!
//! These are the only shapes the rest of the crate sees. Backend field names
//! never leak past [`super::conversions`].

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use everything_store_core::{
    AddressId, AddressKind, CartItemId, Email, Price, ProductId, SessionToken, UserId,
};

// =============================================================================
// Users & Auth
// =============================================================================

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
}

/// Login form payload.
#[derive(Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    pub(crate) fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email.as_str(),
            "password": self.password.expose_secret(),
        })
    }
}

/// Signup form payload.
#[derive(Clone)]
pub struct SignupRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Email,
    pub password: SecretString,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SignupRequest {
    pub(crate) fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "username": self.username,
            "first_name": self.first_name,
            "last_name": self.last_name,
            "phone": self.phone,
            "email": self.email.as_str(),
            "password": self.password.expose_secret(),
        })
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    /// Token to present on later requests, when the backend issues one.
    pub token: Option<SessionToken>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Empty when the backend has no description for the product.
    pub description: String,
    pub price: Price,
    /// Image URL; empty when the product has no image.
    pub image: String,
    /// Average rating out of 5, when the endpoint reports one.
    pub rating: Option<u8>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
}

// =============================================================================
// Cart
// =============================================================================

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

// =============================================================================
// Addresses
// =============================================================================

/// A saved postal address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: AddressId,
    pub kind: AddressKind,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Payload for creating or editing an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(rename = "type")]
    pub kind: AddressKind,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

// =============================================================================
// Write acknowledgements
// =============================================================================

/// Body of a write endpoint (add to cart, checkout, create, delete, ...).
///
/// The backend answers these with either a bare JSON string or a small object;
/// both are reduced to an optional human-readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: Option<String>,
    /// Token carried by some responses (signup). Callers decide whether to use it.
    pub token: Option<SessionToken>,
}

impl Acknowledgement {
    /// Message to show the user, or `default` when the backend sent none.
    #[must_use]
    pub fn message_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(default)
    }
}
