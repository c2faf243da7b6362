//! Signup, login, logout and profile.

use std::io::Write;

use everything_store_client::AppState;
use everything_store_client::pages::{self, LoginForm, SignupForm};

use super::{CliError, emit};

pub async fn signup(
    state: &AppState,
    out: &mut impl Write,
    form: SignupForm,
) -> Result<(), CliError> {
    emit(out, pages::signup(state, &form).await)?;
    Ok(())
}

pub async fn login(
    state: &AppState,
    out: &mut impl Write,
    email: &str,
    password: String,
) -> Result<(), CliError> {
    let form = LoginForm {
        email: email.to_string(),
        password,
    };
    emit(out, pages::login(state, &form).await)?;
    Ok(())
}

pub fn logout(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    emit(out, pages::logout(state))?;
    Ok(())
}

pub fn profile(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    emit(out, pages::profile_page(state))?;
    Ok(())
}
