//! Pestshop CLI - a file-backed cart with chat checkout.
//!
//! # Usage
//!
//! ```bash
//! # Add two bait stations to the cart
//! pestshop add bait-01 "Termite Bait Station" --category Termites --quantity 2
//!
//! # Change or remove a line
//! pestshop set bait-01 5
//! pestshop remove bait-01
//!
//! # Print the cart, or empty it
//! pestshop show
//! pestshop clear
//!
//! # Compose the order and print the chat links
//! pestshop checkout --phone "+1 555 010 9999"
//! ```
//!
//! # Environment Variables
//!
//! - `PESTSHOP_STORE_DIR` - Directory holding the cart file (default `.pestshop`)
//! - `PESTSHOP_CHECKOUT_PHONE` - Destination number for `checkout`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pestshop_core::{FileStore, Ledger, Platform};

mod commands;

#[derive(Parser)]
#[command(name = "pestshop")]
#[command(author, version, about = "Pestshop cart tools")]
struct Cli {
    /// Directory holding the cart file
    #[arg(long, env = "PESTSHOP_STORE_DIR", default_value = ".pestshop", global = true)]
    store_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a product, merging with an existing line of the same id
    Add {
        /// Product id
        id: String,

        /// Display name
        name: String,

        /// Display category
        #[arg(short, long)]
        category: Option<String>,

        /// Number of units to add
        #[arg(short, long)]
        quantity: Option<u32>,
    },
    /// Remove a line
    Remove {
        /// Product id
        id: String,
    },
    /// Set a line's quantity; zero or less removes it
    Set {
        /// Product id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Print the cart
    Show,
    /// Compose the order summary and print the chat links
    Checkout {
        /// Destination phone number
        #[arg(long, env = "PESTSHOP_CHECKOUT_PHONE")]
        phone: String,

        /// Print the single mobile link instead of the desktop pair
        #[arg(long)]
        mobile: bool,

        /// Desktop fallback delay in milliseconds
        #[arg(long)]
        fallback_ms: Option<u64>,
    },
}

fn main() {
    dotenvy::dotenv().ok();

    // Output goes to stdout; logs stay on stderr.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pestshop_core=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let mut ledger = Ledger::open(FileStore::new(cli.store_dir));

    let output = match cli.command {
        Commands::Add {
            id,
            name,
            category,
            quantity,
        } => commands::cart::add(&mut ledger, &id, &name, category.as_deref(), quantity)?,
        Commands::Remove { id } => commands::cart::remove(&mut ledger, &id)?,
        Commands::Set { id, quantity } => commands::cart::set(&mut ledger, &id, quantity)?,
        Commands::Clear => commands::cart::clear(&mut ledger),
        Commands::Show => commands::cart::show(&ledger),
        Commands::Checkout {
            phone,
            mobile,
            fallback_ms,
        } => {
            let platform = if mobile {
                Platform::Mobile
            } else {
                Platform::Desktop
            };
            commands::checkout::run(&ledger, &phone, platform, fallback_ms)?
        }
    };

    print_output(&output);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_output(output: &str) {
    println!("{output}");
}
