//! Cart commands.

use std::io::Write;

use everything_store_client::AppState;
use everything_store_client::pages::{self, Navigation, Page};
use everything_store_core::ProductId;

use super::{CliError, emit, render};

pub async fn show(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    emit(out, pages::cart_page(state).await)?;
    Ok(())
}

pub async fn add(
    state: &AppState,
    out: &mut impl Write,
    product_id: &ProductId,
    quantity: u32,
) -> Result<(), CliError> {
    if emit(out, pages::add_to_cart(state, product_id, quantity).await)?.is_some() {
        return Ok(());
    }
    let cart = state.cart().state();
    writeln!(
        out,
        "Cart: {} item(s), {}",
        cart.total_items(),
        cart.total_price()
    )?;
    Ok(())
}

pub async fn remove(
    state: &AppState,
    out: &mut impl Write,
    product_id: &ProductId,
) -> Result<(), CliError> {
    emit(out, pages::remove_from_cart(state, product_id).await)?;
    Ok(())
}

pub async fn checkout(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    complete(state, out, pages::checkout(state).await)
}

pub async fn buy(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    complete(state, out, pages::buy_now(state).await)
}

/// Show the confirmation page after a successful checkout or purchase, or the
/// cart with its error otherwise.
fn complete(
    state: &AppState,
    out: &mut impl Write,
    page: Page<pages::CartView>,
) -> Result<(), CliError> {
    match page {
        Page::Redirect {
            to: to @ (Navigation::CheckoutSuccess | Navigation::PurchaseSuccess),
            notice,
        } => emit(out, pages::order_placed_page(state, &to, notice)).map(|_| ()),
        Page::Render(view) => render(out, &view),
        page @ Page::Redirect { .. } => emit(out, page).map(|_| ()),
    }
}
