//! Catalog commands.

use std::io::Write;

use everything_store_client::AppState;
use everything_store_client::pages::{self, Navigation, ProductForm};
use everything_store_core::ProductId;

use super::{CliError, emit, render};

pub async fn list(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    render(out, &pages::products_page(state).await)
}

pub async fn show(state: &AppState, out: &mut impl Write, id: &ProductId) -> Result<(), CliError> {
    render(out, &pages::product_detail_page(state, id).await)
}

pub async fn search(state: &AppState, out: &mut impl Write, query: &str) -> Result<(), CliError> {
    render(out, &pages::search_page(state, query).await)
}

pub async fn add(
    state: &AppState,
    out: &mut impl Write,
    form: ProductForm,
) -> Result<(), CliError> {
    if emit(out, pages::add_product(state, &form).await)? == Some(Navigation::Products) {
        list(state, out).await?;
    }
    Ok(())
}
