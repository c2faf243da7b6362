//! Everything Store Core - Shared types library.
//!
//! This crate provides common types used across all Everything Store components:
//! - `client` - API client layer, state containers and page controllers
//! - `cli` - The `store` command-line storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, address kinds and tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
