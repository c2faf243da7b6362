//! Subcommand implementations.
//!
//! Each command calls one page controller and writes the result: a rendered
//! view, or the notice and destination of a redirect.

pub mod account;
pub mod addresses;
pub mod cart;
pub mod products;

use std::io::{self, Write};

use askama::Template;
use thiserror::Error;

use everything_store_client::AppError;
use everything_store_client::pages::{Navigation, Page};

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

impl From<askama::Error> for CliError {
    fn from(err: askama::Error) -> Self {
        Self::App(AppError::Render(err))
    }
}

impl CliError {
    /// Report to Sentry when the error is unexpected.
    pub fn report(&self) {
        if let Self::App(err) = self {
            err.report();
        }
    }
}

/// Write a rendered view.
pub fn render(out: &mut impl Write, view: &impl Template) -> Result<(), CliError> {
    writeln!(out, "{}", view.render()?.trim_end())?;
    Ok(())
}

/// Write a page outcome. Returns the redirect target, if any, so callers can
/// follow it.
pub fn emit<T: Template>(
    out: &mut impl Write,
    page: Page<T>,
) -> Result<Option<Navigation>, CliError> {
    match page {
        Page::Render(view) => {
            render(out, &view)?;
            Ok(None)
        }
        Page::Redirect { to, notice } => {
            if let Some(notice) = notice {
                writeln!(out, "{notice}")?;
            } else if to == Navigation::Login {
                writeln!(out, "Please log in first: store login --email <email>")?;
            }
            tracing::debug!(to = %to, "Redirect");
            Ok(Some(to))
        }
    }
}
