//! Minishop CLI - Database migrations and shop management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! minishop migrate
//!
//! # Load products from a YAML file
//! minishop catalog seed catalog.yaml
//!
//! # Show the catalog
//! minishop catalog list
//!
//! # Show the 20 most recent orders
//! minishop orders list --limit 20
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `catalog seed` / `catalog list` - Manage products
//! - `orders list` - Inspect placed orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "minishop")]
#[command(author, version, about = "Minishop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect placed orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Insert products from a YAML seed file
    Seed {
        /// Path to the YAML file
        file: String,
    },
    /// List every product
    List,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List recent orders, newest first
    List {
        /// Maximum number of orders to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Catalog { action } => match action {
            CatalogAction::Seed { file } => commands::catalog::seed(&file).await?,
            CatalogAction::List => commands::catalog::list().await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { limit } => commands::orders::list(limit).await?,
        },
    }
    Ok(())
}
