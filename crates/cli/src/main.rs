//! Shopfront CLI - Browse the catalog, manage the cart and track orders from
//! the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! shopfront products --category Books --sort price
//! shopfront product 42
//!
//! # Cart (guest unless SHOPFRONT_API_TOKEN is set)
//! shopfront cart add 42 -q 2
//! shopfront cart show
//!
//! # Checkout from a YAML form
//! shopfront checkout --details checkout.yaml
//!
//! # Orders
//! shopfront orders track 1001
//! ```
//!
//! # Commands
//!
//! - `products`, `product`, `categories` - Catalog
//! - `cart` - Show and change the session cart
//! - `checkout` - Place an order for the cart
//! - `orders` - Order history, tracking and cancellation
//! - `admin` - Dashboard stats and product management

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use shopfront_storefront::api::ProductSort;
use shopfront_storefront::{AppError, StorefrontConfig, telemetry};

mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Category name
        #[arg(short, long)]
        category: Option<String>,

        /// Minimum price
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Maximum price
        #[arg(long)]
        max_price: Option<Decimal>,

        /// Sort order (`name`, `price`, `newest`)
        #[arg(long)]
        sort: Option<ProductSort>,

        /// Maximum number of products
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one product
    Product {
        /// Product ID
        id: String,
    },
    /// List categories
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart
    Checkout {
        /// YAML file with shipping and payment details
        #[arg(short, long)]
        details: PathBuf,
    },
    /// Order history and tracking
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Store administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 or less removes it)
    Set {
        /// Cart line ID
        line_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Cart line ID
        line_id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders
    List {
        /// Maximum number of orders
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show an order
    Show {
        /// Order ID
        id: String,
    },
    /// Show tracking for an order
    Track {
        /// Order ID
        id: String,
    },
    /// Cancel a pending order
    Cancel {
        /// Order ID
        id: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Show dashboard counters
    Stats,
    /// Create a product from a YAML file
    CreateProduct {
        /// YAML file with the product fields
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Replace a product's fields from a YAML file
    UpdateProduct {
        /// Product ID
        id: String,

        /// YAML file with the product fields
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a product
    DeleteProduct {
        /// Product ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry first, then the subscriber; keep the guard until exit
    let sentry_guard = telemetry::init(&config);

    let result = run(cli, &config).await;

    if let Err(e) = result {
        e.report();
        commands::render::error(&e);
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), AppError> {
    match cli.command {
        Commands::Products {
            search,
            category,
            min_price,
            max_price,
            sort,
            limit,
        } => {
            let query = shopfront_storefront::api::ProductQuery {
                search,
                category,
                min_price,
                max_price,
                sort_by: sort,
                limit,
            };
            commands::catalog::products(config, &query).await?;
        }
        Commands::Product { id } => commands::catalog::product(config, &id.into()).await?,
        Commands::Categories => commands::catalog::categories(config).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(config).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(config, &product_id.into(), quantity).await?,
            CartAction::Set { line_id, quantity } => {
                commands::cart::set(config, &line_id.into(), quantity).await?;
            }
            CartAction::Remove { line_id } => {
                commands::cart::remove(config, &line_id.into()).await?;
            }
            CartAction::Clear => commands::cart::clear(config).await?,
        },
        Commands::Checkout { details } => commands::checkout::run(config, &details).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List { limit } => commands::orders::list(config, limit).await?,
            OrdersAction::Show { id } => commands::orders::show(config, &id.into()).await?,
            OrdersAction::Track { id } => commands::orders::track(config, &id.into()).await?,
            OrdersAction::Cancel { id } => commands::orders::cancel(config, &id.into()).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Stats => commands::admin::stats(config).await?,
            AdminAction::CreateProduct { file } => {
                commands::admin::create_product(config, &file).await?;
            }
            AdminAction::UpdateProduct { id, file } => {
                commands::admin::update_product(config, &id.into(), &file).await?;
            }
            AdminAction::DeleteProduct { id } => {
                commands::admin::delete_product(config, &id.into()).await?;
            }
        },
    }
    Ok(())
}
