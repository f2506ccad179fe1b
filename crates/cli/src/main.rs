//! Cartwise CLI - Product search and cart management.
//!
//! # Usage
//!
//! ```bash
//! # Search the catalog
//! cartwise search "arroz integral" --vertical supermarket
//!
//! # Inspect and edit the cart
//! cartwise cart show
//! cartwise cart add 123 -q 3
//! cartwise cart set 123 1
//! cartwise cart remove 123
//! cartwise cart clear
//! ```
//!
//! Without `CARTWISE_SESSION_TOKEN` the cart lives in a local JSON file
//! (`CARTWISE_LOCAL_CART_PATH`). With a token every command works against the
//! server cart.
//!
//! # Commands
//!
//! - `search` - Query the product catalog
//! - `cart` - Show or modify the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartwise_client::{ClientConfig, ClientError};
use cartwise_core::Vertical;

mod commands;

#[derive(Parser)]
#[command(name = "cartwise")]
#[command(author, version, about = "Cartwise product search and cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the product catalog
    Search {
        /// Free-text query
        query: String,

        /// Restrict results to one vertical (`supermarket`, `pharma`, `electronics`)
        #[arg(short, long)]
        vertical: Option<Vertical>,
    },
    /// Show or modify the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart contents and totals
    Show,
    /// Add a product by id
    Add {
        /// Catalog product id
        product_id: String,

        /// Number of units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        /// Catalog product id
        product_id: String,

        /// New quantity
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Catalog product id
        product_id: String,
    },
    /// Remove every line
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed before tracing for the Sentry DSN
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => exit_with(&ClientError::from(e)),
    };

    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwise_client=info,cartwise_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!(error = %e, "Command failed");
        exit_with(&e);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> cartwise_client::Result<()> {
    match cli.command {
        Commands::Search { query, vertical } => {
            commands::search::run(config, &query, vertical).await?;
        }
        Commands::Cart { action } => {
            let mut session = commands::cart::CartSession::open(config).await?;
            match action {
                CartAction::Show => {}
                CartAction::Add {
                    product_id,
                    quantity,
                } => session.add(&product_id.into(), quantity).await?,
                CartAction::Set {
                    product_id,
                    quantity,
                } => session.set_quantity(&product_id.into(), quantity).await?,
                CartAction::Remove { product_id } => session.remove(&product_id.into()).await?,
                CartAction::Clear => session.clear().await?,
            }
            session.save().await?;
            commands::cart::print_cart(&session.snapshot());
        }
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn exit_with(err: &ClientError) -> ! {
    eprintln!("error: {}", err.user_message());
    std::process::exit(1);
}
