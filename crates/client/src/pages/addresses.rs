//! Address book page.

use askama::Template;
use tracing::instrument;

use everything_store_core::AddressId;

use super::forms::AddressForm;
use super::views::AddressRow;
use super::{Navigation, Page};
use crate::state::AppState;

/// Address list template.
#[derive(Debug, Template)]
#[template(path = "addresses.txt")]
pub struct AddressesView {
    pub addresses: Vec<AddressRow>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// List the user's addresses.
#[instrument(skip(state))]
pub async fn addresses_page(state: &AppState) -> Page<AddressesView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }
    Page::Render(load(state, None, None).await)
}

/// Add a new address, then list again.
#[instrument(skip(state, form))]
pub async fn save_address(state: &AppState, form: &AddressForm) -> Page<AddressesView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return Page::Render(load(state, None, Some(e.to_string())).await),
    };

    let view = match state.api().add_address(&input).await {
        Ok(ack) => {
            let notice = ack.message_or("Address added successfully").to_string();
            load(state, Some(notice), None).await
        }
        Err(e) => load(state, None, Some(e.to_string())).await,
    };
    Page::Render(view)
}

/// Update an existing address, then list again.
///
/// The home or work endpoint is chosen by the stored address's type, not by
/// the type in the form.
#[instrument(skip(state, id, form), fields(address_id = %id))]
pub async fn edit_address(
    state: &AppState,
    id: &AddressId,
    form: &AddressForm,
) -> Page<AddressesView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return Page::Render(load(state, None, Some(e.to_string())).await),
    };

    let existing = match state.api().get_addresses().await {
        Ok(addresses) => addresses.into_iter().find(|address| &address.id == id),
        Err(e) => return Page::Render(load(state, None, Some(e.to_string())).await),
    };
    let Some(existing) = existing else {
        return Page::Render(load(state, None, Some("Address not found".to_string())).await);
    };

    let view = match state.api().edit_address(existing.kind, id, &input).await {
        Ok(ack) => {
            let notice = ack.message_or("Address updated successfully").to_string();
            load(state, Some(notice), None).await
        }
        Err(e) => load(state, None, Some(e.to_string())).await,
    };
    Page::Render(view)
}

/// Delete an address, then list again.
#[instrument(skip(state, id), fields(address_id = %id))]
pub async fn delete_address(state: &AppState, id: &AddressId) -> Page<AddressesView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }

    let view = match state.api().delete_address(id).await {
        Ok(ack) => {
            let notice = ack.message_or("Address deleted successfully").to_string();
            load(state, Some(notice), None).await
        }
        Err(e) => load(state, None, Some(e.to_string())).await,
    };
    Page::Render(view)
}

/// Fetch the list. A failed fetch replaces `error` only when there is none.
async fn load(state: &AppState, notice: Option<String>, error: Option<String>) -> AddressesView {
    match state.api().get_addresses().await {
        Ok(addresses) => AddressesView {
            addresses: addresses.iter().map(AddressRow::from).collect(),
            notice,
            error,
        },
        Err(e) => AddressesView {
            addresses: Vec::new(),
            notice,
            error: error.or_else(|| Some(e.to_string())),
        },
    }
}
