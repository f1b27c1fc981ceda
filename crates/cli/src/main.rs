//! Atelier CLI - Database migrations and catalog imports.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! atelier migrate
//!
//! # Import catalog records from a JSON file
//! atelier import --type brands --file brands.json
//! atelier import --file products-envelope.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run the embedded storefront migrations
//! - `import` - Validate and write a file of brands, collections or products

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Atelier CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Import catalog records from a JSON file
    Import {
        /// Record type (`brands`, `collections`, `products`); required for a bare array
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// JSON file holding an array of records or a `{type, data}` envelope
        #[arg(short, long)]
        file: PathBuf,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Import { kind, file } => {
            commands::import::run(kind.as_deref(), &file).await?;
        }
    }
    Ok(())
}
