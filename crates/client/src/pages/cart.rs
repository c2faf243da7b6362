//! Cart page and order completion.

use askama::Template;
use tracing::instrument;

use everything_store_core::ProductId;

use super::views::CartLine;
use super::{Navigation, Page};
use crate::api::Acknowledgement;
use crate::state::{AppState, CartError, CartState};

/// Cart page template.
#[derive(Debug, Template)]
#[template(path = "cart.txt")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_items: u32,
    pub total_price: String,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl CartView {
    fn from_state(state: &CartState) -> Self {
        Self {
            items: state.items.iter().map(CartLine::from).collect(),
            total_items: state.total_items(),
            total_price: state.total_price().to_string(),
            notice: None,
            error: state.error.clone(),
        }
    }
}

/// Checkout and purchase confirmation template.
#[derive(Debug, Template)]
#[template(path = "order_placed.txt")]
pub struct OrderPlacedView {
    pub title: &'static str,
    pub message: String,
}

/// Show the cart, freshly loaded from the backend.
#[instrument(skip(state))]
pub async fn cart_page(state: &AppState) -> Page<CartView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }
    state.cart().refresh().await;
    Page::Render(CartView::from_state(&state.cart().state()))
}

/// Remove a product's line and show the cart again.
#[instrument(skip(state, product_id), fields(product_id = %product_id))]
pub async fn remove_from_cart(state: &AppState, product_id: &ProductId) -> Page<CartView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }
    let result = state.cart().remove_item(product_id).await;
    stay_on_cart(state, result, "Item removed from cart")
}

/// Check out. Success goes to the checkout confirmation; failure stays on the
/// cart with the error.
#[instrument(skip(state))]
pub async fn checkout(state: &AppState) -> Page<CartView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }
    match state.cart().checkout().await {
        Ok(ack) => Page::redirect_with(
            Navigation::CheckoutSuccess,
            ack.message_or("Your order has been successfully processed."),
        ),
        Err(e) => cart_with_error(state, &e),
    }
}

/// Buy immediately. Success goes to the purchase confirmation; failure stays
/// on the cart with the error.
#[instrument(skip(state))]
pub async fn buy_now(state: &AppState) -> Page<CartView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }
    match state.cart().buy_now().await {
        Ok(ack) => Page::redirect_with(
            Navigation::PurchaseSuccess,
            ack.message_or("Your purchase is complete."),
        ),
        Err(e) => cart_with_error(state, &e),
    }
}

/// Confirmation page for a completed checkout or purchase.
#[must_use]
pub fn order_placed_page(
    state: &AppState,
    to: &Navigation,
    notice: Option<String>,
) -> Page<OrderPlacedView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }
    let title = match to {
        Navigation::PurchaseSuccess => "Purchase Successful!",
        _ => "Checkout Successful!",
    };
    Page::Render(OrderPlacedView {
        title,
        message: notice
            .unwrap_or_else(|| "Your order has been successfully processed.".to_string()),
    })
}

fn stay_on_cart(
    state: &AppState,
    result: Result<Acknowledgement, CartError>,
    success: &str,
) -> Page<CartView> {
    match result {
        Ok(ack) => {
            let mut view = CartView::from_state(&state.cart().state());
            view.notice = Some(ack.message_or(success).to_string());
            Page::Render(view)
        }
        Err(e) => cart_with_error(state, &e),
    }
}

fn cart_with_error(state: &AppState, error: &CartError) -> Page<CartView> {
    let mut view = CartView::from_state(&state.cart().state());
    view.error = Some(error.to_string());
    Page::Render(view)
}
