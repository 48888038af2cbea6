//! ShopHub CLI - Database migrations and order management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (including the session table)
//! shophub-cli migrate
//!
//! # Inspect and advance orders
//! shophub-cli orders show ORD-1760432400000-K3J9QZ2XA
//! shophub-cli orders advance ORD-1760432400000-K3J9QZ2XA --status shipped --step 3
//! shophub-cli orders stats
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `orders` - Show, advance and summarize orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shophub-cli")]
#[command(author, version, about = "ShopHub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Show an order by order number or ID
    Show {
        /// Order number (`ORD-...`) or order ID
        lookup: String,
    },
    /// Move an order to a new status
    Advance {
        /// Order number (`ORD-...`) or order ID
        lookup: String,

        /// New status (`pending`, `processing`, `shipped`, `delivered`, `cancelled`)
        #[arg(short, long)]
        status: String,

        /// Tracking step to mark complete (0-4)
        #[arg(long)]
        step: Option<usize>,
    },
    /// Print store-wide order figures
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Orders { action } => match action {
            OrderAction::Show { lookup } => commands::orders::show(&lookup).await?,
            OrderAction::Advance {
                lookup,
                status,
                step,
            } => commands::orders::advance(&lookup, &status, step).await?,
            OrderAction::Stats => commands::orders::stats().await?,
        },
    }
    Ok(())
}
