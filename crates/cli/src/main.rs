//! Vitrine CLI - browse the catalog and manage a cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List categories and products
//! vitrine categories
//! vitrine products --category 1 --sort price-low
//!
//! # Search and inspect
//! vitrine search shirt
//! vitrine show 1
//!
//! # Cart (persisted under VITRINE_CART_DIR)
//! vitrine cart add 1 --quantity 2
//! vitrine cart update 1 0
//! vitrine cart list
//! vitrine checkout
//!
//! # Preview the windowed renderer
//! vitrine window --offset 4000 --viewport 600 --overscan 2
//! ```
//!
//! Configuration is read from the environment (and `.env`); see
//! `vitrine_storefront::config`. Set `RUST_LOG` to change log verbosity.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vitrine_core::SortOrder;
use vitrine_storefront::cart::CartStore;
use vitrine_storefront::cart::storage::FileStore;
use vitrine_storefront::catalog::ConfiguredCatalog;
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::notify::TracingNotifier;

mod commands;

use commands::{CliError, Format};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine storefront CLI")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories
    Categories,
    /// List products
    Products {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order (`newest`, `price-low`, `price-high`, `name`)
        #[arg(short, long, default_value = "newest")]
        sort: SortOrder,
    },
    /// Search products by name, code or description
    Search {
        /// Search term
        term: String,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Summarise and clear the cart
    Checkout,
    /// Show which rows a windowed list would render
    Window {
        /// Scroll offset in pixels
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Viewport height in pixels
        #[arg(long)]
        viewport: u32,

        /// Row height in pixels (defaults to `VITRINE_ITEM_HEIGHT`)
        #[arg(long)]
        item_height: Option<u32>,

        /// Extra rows above and below (defaults to `VITRINE_OVERSCAN`)
        #[arg(long)]
        overscan: Option<usize>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents
    List,
    /// Add a product
    Add {
        /// Product ID
        id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: String,
    },
    /// Set a product's quantity (zero or less removes it)
    Update {
        /// Product ID
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove everything
    Clear,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vitrine_storefront=info,vitrine_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = StorefrontConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let format = if cli.json { Format::Json } else { Format::Text };
    let catalog = ConfiguredCatalog::from_config(&config);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Categories => commands::catalog::categories(&catalog, format, &mut out).await?,
        Commands::Products { category, sort } => {
            commands::catalog::products(catalog, &config, category, sort, format, &mut out)
                .await?;
        }
        Commands::Search { term } => {
            commands::catalog::search(catalog, &config, &term, format, &mut out).await?;
        }
        Commands::Show { id } => {
            commands::catalog::show(catalog, &config, &id, format, &mut out).await?;
        }
        Commands::Cart { action } => {
            let mut cart = open_cart(&config)?;
            match action {
                CartAction::List => {}
                CartAction::Add { id, quantity } => {
                    commands::cart::add(&mut cart, &catalog, &id, quantity).await?;
                }
                CartAction::Remove { id } => cart.remove_item(&id),
                CartAction::Update { id, quantity } => cart.update_quantity(&id, quantity),
                CartAction::Clear => cart.clear(),
            }
            commands::cart::list(&cart, config.currency, format, &mut out)?;
        }
        Commands::Checkout => {
            let mut cart = open_cart(&config)?;
            commands::cart::checkout(&mut cart, config.currency, format, &mut out)?;
        }
        Commands::Window {
            offset,
            viewport,
            item_height,
            overscan,
        } => {
            let mut window = config.window;
            window.item_height = item_height.unwrap_or(window.item_height);
            window.overscan = overscan.unwrap_or(window.overscan);
            commands::window::preview(&catalog, &window, offset, viewport, format, &mut out)
                .await?;
        }
    }

    out.flush()?;
    Ok(())
}

fn open_cart(config: &StorefrontConfig) -> Result<CartStore<FileStore, TracingNotifier>, CliError> {
    let store = FileStore::open(config.cart_dir.clone())?;
    Ok(CartStore::new(store, TracingNotifier))
}
