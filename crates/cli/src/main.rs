//! Shopfront CLI - Local and server-confirmed cart tools.
//!
//! # Usage
//!
//! ```bash
//! # Add a product to the local cart (looks the product up on the backend)
//! shopfront cart add --product linen-shirt --size M --quantity 2
//!
//! # Show the local cart
//! shopfront cart show
//!
//! # Set a local line's quantity (zero or less removes it)
//! shopfront cart set 7-2 0
//!
//! # Work with the server-confirmed cart
//! shopfront remote add 7 2 --quantity 1
//! shopfront remote show
//! ```
//!
//! # Commands
//!
//! - `cart` - The locally persisted cart
//! - `remote` - The cart held by the REST backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_core::LineItemId;
use shopfront_storefront::{Error, Result, ShopfrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the server-confirmed cart
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the local cart
    Show,
    /// Add a product to the local cart
    Add {
        /// Product slug
        #[arg(short, long)]
        product: String,

        /// Size id or name
        #[arg(short, long)]
        size: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line from the local cart
    Remove {
        /// Line id
        id: String,
    },
    /// Set a line's quantity; zero or less removes the line
    Set {
        /// Line id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the local cart
    Clear,
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Fetch and show the server cart
    Show,
    /// Add a product size to the server cart
    Add {
        /// Product id
        product: String,

        /// Size id
        size: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a server cart line
    Update {
        /// Server line id
        id: String,

        /// New quantity
        quantity: u32,
    },
    /// Remove a line from the server cart
    Remove {
        /// Server line id
        id: String,
    },
    /// Empty the server cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ShopfrontConfig) -> Option<sentry::ClientInitGuard> {
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Log a failed command.
///
/// Only reportable errors are logged at ERROR, which `sentry_event_filter`
/// turns into a single Sentry event. User mistakes are logged at WARN and
/// reach Sentry as breadcrumbs at most.
fn report_failure(e: &Error) {
    if e.is_reportable() {
        tracing::error!(error = e as &dyn std::error::Error, "Command failed");
    } else {
        tracing::warn!("Command failed: {e}");
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so command output on stdout stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_cli=info,shopfront_storefront=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match ShopfrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report_failure(&Error::from(e));
            std::process::exit(1);
        }
    };

    let sentry_guard = init_sentry(&config);

    if let Err(e) = run(cli, &config).await {
        report_failure(&e);
        // Flush pending Sentry events; exit skips destructors
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ShopfrontConfig) -> Result<()> {
    let output = match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(config),
            CartAction::Add {
                product,
                size,
                quantity,
            } => commands::cart::add(config, &product, &size, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(config, &id),
            CartAction::Set { id, quantity } => commands::cart::set(config, &id, quantity),
            CartAction::Clear => commands::cart::clear(config),
        },
        Commands::Remote { action } => {
            let client = commands::remote::client()?;
            let cart = match action {
                RemoteAction::Show => client.get_cart().await?,
                RemoteAction::Add {
                    product,
                    size,
                    quantity,
                } => commands::remote::add(&client, &product, &size, quantity).await?,
                RemoteAction::Update { id, quantity } => {
                    commands::remote::update(&client, &id, quantity).await?
                }
                RemoteAction::Remove { id } => client.remove_item(&LineItemId::from(id)).await?,
                RemoteAction::Clear => client.clear_cart().await?,
            };
            commands::render(&cart)
        }
    };

    print!("{output}");
    Ok(())
}
