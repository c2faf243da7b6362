//! Page controllers.
//!
//! Each controller loads what its page needs through [`AppState`], validates
//! form input, and either returns a view to render or says where to go next.
//! Views are askama text templates under `templates/`.
//!
//! Expected failures (bad input, backend rejections) are shown on the page as
//! `error`; controllers never return them as `Err`.
//!
//! [`AppState`]: crate::state::AppState

mod addresses;
mod auth;
mod cart;
mod forms;
mod products;
mod profile;
mod views;

pub use addresses::{AddressesView, addresses_page, delete_address, edit_address, save_address};
pub use auth::{LoginView, SignupView, login, signup};
pub use cart::{
    CartView, OrderPlacedView, buy_now, cart_page, checkout, order_placed_page, remove_from_cart,
};
pub use forms::{
    AddressForm, LoginForm, PLACEHOLDER_IMAGE, ProductForm, SignupForm, ValidationError,
};
pub use products::{
    AddProductView, ProductDetailView, ProductsView, SearchView, add_product, add_to_cart,
    product_detail_page, products_page, search_page,
};
pub use profile::{ProfileView, logout, profile_page};
pub use views::{AddressRow, CartLine, ProductCard};

use std::fmt;

use everything_store_core::ProductId;

/// Where the app goes after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Login,
    Index,
    Signup,
    Products,
    ProductDetail(ProductId),
    Search,
    AddProduct,
    Cart,
    CheckoutSuccess,
    PurchaseSuccess,
    Addresses,
    Profile,
}

impl Navigation {
    /// Route path of the destination.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/".to_string(),
            Self::Index => "/index".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::Products => "/users/productview".to_string(),
            Self::ProductDetail(id) => {
                format!("/users/productview/{}", urlencoding::encode(id.as_str()))
            }
            Self::Search => "/users/search".to_string(),
            Self::AddProduct => "/add-product".to_string(),
            Self::Cart => "/cart".to_string(),
            Self::CheckoutSuccess => "/checkout-success".to_string(),
            Self::PurchaseSuccess => "/purchase-success".to_string(),
            Self::Addresses => "/addresses".to_string(),
            Self::Profile => "/profile".to_string(),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a page controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page<T> {
    /// Stay and show this view.
    Render(T),
    /// Leave for another page, optionally with a notice to show there.
    Redirect {
        to: Navigation,
        notice: Option<String>,
    },
}

impl<T> Page<T> {
    /// Redirect without a notice.
    #[must_use]
    pub const fn redirect(to: Navigation) -> Self {
        Self::Redirect { to, notice: None }
    }

    /// Redirect carrying a notice.
    #[must_use]
    pub fn redirect_with(to: Navigation, notice: impl Into<String>) -> Self {
        Self::Redirect {
            to,
            notice: Some(notice.into()),
        }
    }

    /// Destination, if this is a redirect.
    #[must_use]
    pub const fn navigation(&self) -> Option<&Navigation> {
        match self {
            Self::Render(_) => None,
            Self::Redirect { to, .. } => Some(to),
        }
    }

    /// The view, if this page renders.
    #[must_use]
    pub fn into_view(self) -> Option<T> {
        match self {
            Self::Render(view) => Some(view),
            Self::Redirect { .. } => None,
        }
    }
}
