//! Everything Store CLI - the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account, then log in
//! store signup --first-name Ada --last-name Lovelace --phone 555-0100 \
//!     --email ada@example.com --password engine1
//! store login --email ada@example.com --password engine1
//!
//! # Browse and buy
//! store products list
//! store products search widget
//! store cart add <product-id> --quantity 2
//! store cart checkout
//!
//! # Forget the saved login
//! store logout
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_API_URL` - Backend base URL (default: `http://localhost:8000`)
//! - `STORE_SESSION_FILE` - Saved login location
//! - `STORE_PASSWORD` - Password for `login`/`signup` when `--password` is omitted
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` - Error tracking
//! - `RUST_LOG` - Log filter (logs go to stderr)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use everything_store_client::{AppState, ClientConfig};
use everything_store_core::{AddressId, AddressKind, ProductId};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "store")]
#[command(author, version, about = "Everything Store command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account (does not log in)
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "STORE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to `--password`
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "STORE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Profile,
    /// Browse and add products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage saved addresses
    Addresses {
        #[command(subcommand)]
        action: AddressesAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List every product
    List,
    /// Show one product
    Show { id: ProductId },
    /// Search products by name
    Search {
        #[arg(num_args = 0..)]
        query: Vec<String>,
    },
    /// Create a product
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: String,
        #[arg(short, long)]
        price: String,
        /// Image URL; a placeholder is used when omitted
        #[arg(short, long, default_value = "")]
        image: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product_id: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove { product_id: ProductId },
    /// Check out the cart
    Checkout,
    /// Buy the cart contents now
    Buy,
}

#[derive(Subcommand)]
enum AddressesAction {
    /// List saved addresses
    List,
    /// Add an address
    Add {
        #[command(flatten)]
        fields: AddressArgs,
    },
    /// Edit an address
    Edit {
        id: AddressId,
        #[command(flatten)]
        fields: AddressArgs,
    },
    /// Delete an address
    Delete { id: AddressId },
}

#[derive(clap::Args)]
struct AddressArgs {
    /// `home` or `work`
    #[arg(long = "type", default_value = "home")]
    kind: AddressKind,
    #[arg(long, default_value = "")]
    street: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long, default_value = "")]
    state: String,
    #[arg(long, default_value = "")]
    zip_code: String,
    #[arg(long, default_value = "")]
    country: String,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(io::stderr(), "Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "everything_store_client=info,everything_store_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            let _ = writeln!(io::stderr(), "Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CliError> {
    let state = AppState::new(config).await?;
    let out = &mut io::stdout().lock();

    match cli.command {
        Commands::Signup {
            first_name,
            last_name,
            phone,
            email,
            password,
            confirm_password,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            commands::account::signup(
                &state,
                out,
                everything_store_client::pages::SignupForm {
                    first_name,
                    last_name,
                    phone,
                    email,
                    password,
                    confirm_password,
                },
            )
            .await?;
        }
        Commands::Login { email, password } => {
            commands::account::login(&state, out, &email, password).await?;
        }
        Commands::Logout => commands::account::logout(&state, out)?,
        Commands::Profile => commands::account::profile(&state, out)?,
        Commands::Products { action } => match action {
            ProductsAction::List => commands::products::list(&state, out).await?,
            ProductsAction::Show { id } => commands::products::show(&state, out, &id).await?,
            ProductsAction::Search { query } => {
                commands::products::search(&state, out, &query.join(" ")).await?;
            }
            ProductsAction::Add {
                name,
                description,
                price,
                image,
            } => {
                commands::products::add(
                    &state,
                    out,
                    everything_store_client::pages::ProductForm {
                        name,
                        description,
                        price,
                        image,
                    },
                )
                .await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state, out).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&state, out, &product_id, quantity).await?,
            CartAction::Remove { product_id } => {
                commands::cart::remove(&state, out, &product_id).await?;
            }
            CartAction::Checkout => commands::cart::checkout(&state, out).await?,
            CartAction::Buy => commands::cart::buy(&state, out).await?,
        },
        Commands::Addresses { action } => match action {
            AddressesAction::List => commands::addresses::list(&state, out).await?,
            AddressesAction::Add { fields } => {
                commands::addresses::add(&state, out, fields.into()).await?;
            }
            AddressesAction::Edit { id, fields } => {
                commands::addresses::edit(&state, out, &id, fields.into()).await?;
            }
            AddressesAction::Delete { id } => {
                commands::addresses::delete(&state, out, &id).await?;
            }
        },
    }

    Ok(())
}

impl From<AddressArgs> for everything_store_client::pages::AddressForm {
    fn from(args: AddressArgs) -> Self {
        Self {
            kind: args.kind,
            street: args.street,
            city: args.city,
            state: args.state,
            zip_code: args.zip_code,
            country: args.country,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from(["store", "cart", "add", "p1", "--quantity", "3"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Add { quantity: 3, .. }
            })
        ));
    }

    #[test]
    fn test_parse_address_type() {
        let cli = Cli::try_parse_from([
            "store", "addresses", "add", "--type", "work", "--street", "1 Main St",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Addresses {
                action: AddressesAction::Add {
                    fields: AddressArgs {
                        kind: AddressKind::Work,
                        ..
                    }
                }
            })
        ));
    }
}
