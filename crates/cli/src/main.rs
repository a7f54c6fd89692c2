//! Band merch CLI - drive the storefront library from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog
//! bandmerch catalog
//!
//! # Listings for one band
//! bandmerch catalog --band "Night Ferry"
//!
//! # Build a cart and print the lines and total
//! bandmerch cart demo-1 demo-1 demo-4
//!
//! # Read or change the saved theme
//! bandmerch theme get
//! bandmerch theme set dark
//! ```
//!
//! # Commands
//!
//! - `catalog` - List merchandise, deduplicated by id
//! - `cart` - Add items to a fresh cart and print it
//! - `theme` - Read or write the theme preference
//!
//! Configuration comes from the `BANDMERCH_*` environment variables (see
//! `bandmerch_storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bandmerch_storefront::AppState;
use bandmerch_storefront::config::StorefrontConfig;
use bandmerch_storefront::telemetry::{init_sentry, init_tracing};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "bandmerch")]
#[command(author, version, about = "Band merch storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog items
    Catalog {
        /// Only show items from this band
        #[arg(short, long)]
        band: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add items to a cart and print it
    Cart {
        /// Item ids; repeat an id to add more than one unit
        item_ids: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Read or write the theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the saved preference
    Get,
    /// Save a preference (`system`, `light` or `dark`)
    Set { value: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config.sentry);
    init_tracing(config.log_json);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CommandError> {
    let state = AppState::from_config(config).await?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Catalog { band, json } => {
            commands::catalog::run(&state, band.as_deref(), json, &mut out).await?;
        }
        Commands::Cart { item_ids, json } => {
            commands::cart::run(&state, &item_ids, json, &mut out).await?;
        }
        Commands::Theme { action } => match action.unwrap_or(ThemeAction::Get) {
            ThemeAction::Get => commands::theme::get(&state, &mut out).await?,
            ThemeAction::Set { value } => commands::theme::set(&state, &value, &mut out).await?,
        },
    }
    Ok(())
}
