//! Profile page.

use askama::Template;

use super::{Navigation, Page};
use crate::state::AppState;

/// Profile page template.
#[derive(Debug, Template)]
#[template(path = "profile.txt")]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub cart_items: u32,
}

/// Show the logged-in user.
#[must_use]
pub fn profile_page(state: &AppState) -> Page<ProfileView> {
    let Some(user) = state.auth().current_user() else {
        return Page::redirect(Navigation::Login);
    };

    Page::Render(ProfileView {
        username: user.username,
        email: user.email.into_inner(),
        cart_items: state.cart().total_items(),
    })
}

/// Log out and go to the login page.
#[must_use]
pub fn logout(state: &AppState) -> Page<ProfileView> {
    state.logout();
    Page::redirect_with(Navigation::Login, "You have been logged out.")
}
