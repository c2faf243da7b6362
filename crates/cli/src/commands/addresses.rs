//! Address book commands.

use std::io::Write;

use everything_store_client::AppState;
use everything_store_client::pages::{self, AddressForm};
use everything_store_core::AddressId;

use super::{CliError, emit};

pub async fn list(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    emit(out, pages::addresses_page(state).await)?;
    Ok(())
}

pub async fn add(
    state: &AppState,
    out: &mut impl Write,
    form: AddressForm,
) -> Result<(), CliError> {
    emit(out, pages::save_address(state, &form).await)?;
    Ok(())
}

pub async fn edit(
    state: &AppState,
    out: &mut impl Write,
    id: &AddressId,
    form: AddressForm,
) -> Result<(), CliError> {
    emit(out, pages::edit_address(state, id, &form).await)?;
    Ok(())
}

pub async fn delete(state: &AppState, out: &mut impl Write, id: &AddressId) -> Result<(), CliError> {
    emit(out, pages::delete_address(state, id).await)?;
    Ok(())
}
