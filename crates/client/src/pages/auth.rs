//! Login and signup pages.

use askama::Template;
use tracing::instrument;

use super::forms::{LoginForm, SignupForm};
use super::{Navigation, Page};
use crate::state::AppState;

/// Login page template.
#[derive(Debug, Template)]
#[template(path = "login.txt")]
pub struct LoginView {
    pub email: String,
    pub error: Option<String>,
}

/// Signup page template.
#[derive(Debug, Template)]
#[template(path = "signup.txt")]
pub struct SignupView {
    pub email: String,
    pub error: Option<String>,
}

/// Submit the login form. Success goes to the index page.
#[instrument(skip(state, form))]
pub async fn login(state: &AppState, form: &LoginForm) -> Page<LoginView> {
    let failed = |error: String| {
        Page::Render(LoginView {
            email: form.email.trim().to_string(),
            error: Some(error),
        })
    };

    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(e) => return failed(e.to_string()),
    };

    match state.auth().login(&credentials).await {
        Ok(user) => Page::redirect_with(Navigation::Index, format!("Welcome, {}!", user.username)),
        Err(e) => failed(e.to_string()),
    }
}

/// Submit the signup form. Success goes to the login page; the new account
/// is not logged in.
#[instrument(skip(state, form))]
pub async fn signup(state: &AppState, form: &SignupForm) -> Page<SignupView> {
    let failed = |error: String| {
        Page::Render(SignupView {
            email: form.email.trim().to_string(),
            error: Some(error),
        })
    };

    let request = match form.validate() {
        Ok(request) => request,
        Err(e) => return failed(e.to_string()),
    };

    match state.auth().signup(&request).await {
        Ok(ack) => Page::redirect_with(
            Navigation::Login,
            ack.message_or("Account created. Please log in."),
        ),
        Err(e) => failed(format!("Signup failed: {e}")),
    }
}
