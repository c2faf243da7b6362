//! Core types for the Everything Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod price;
pub mod token;

pub use address::{AddressKind, AddressKindError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use token::SessionToken;
