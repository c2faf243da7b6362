//! Everything Store client library.
//!
//! The storefront's client side as a library: the REST API client, the
//! session marker, the auth and cart state containers, and the page
//! controllers the `store` binary drives.
//!
//! # Data flow
//!
//! page controller → container method → [`api::ApiClient`] → backend →
//! container state update (watch channel) → pages read the new state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod pages;
pub mod session;
pub mod state;

pub use config::ClientConfig;
pub use error::AppError;
pub use state::AppState;
