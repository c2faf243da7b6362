//! Display data shared by several templates.

use crate::api::{Address, CartItem, Product};

/// Product display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    /// Rendered as `4/5`; empty when unrated.
    pub rating: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
            rating: product
                .rating
                .map(|rating| format!("{rating}/5"))
                .unwrap_or_default(),
        }
    }
}

/// Cart line display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.product.name.clone(),
            quantity: item.quantity,
            price: item.product.price.to_string(),
            line_total: item.line_total().to_string(),
        }
    }
}

/// Address display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRow {
    pub id: String,
    pub label: &'static str,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl From<&Address> for AddressRow {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            label: address.kind.label(),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            country: address.country.clone(),
        }
    }
}
