//! MenuDigital CLI - session migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! md-cli migrate storefront
//!
//! # Create the admin session schema and table
//! md-cli migrate admin
//!
//! # Both
//! md-cli migrate all
//!
//! # Load a tenant with categories and products from YAML
//! md-cli seed demo/seed.yaml --owner 6f1c...-uuid
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create session tables
//! - `seed` - Create or top up a tenant's catalog through the Supabase API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use menudigital_core::UserId;

mod commands;

#[derive(Parser)]
#[command(name = "md-cli")]
#[command(author, version, about = "MenuDigital CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create session tables
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Seed a tenant's catalog from a YAML file
    Seed {
        /// Path to the seed file
        file: PathBuf,

        /// Link the company to this user's profile
        #[arg(long)]
        owner: Option<UserId>,

        /// Parse and validate the file without calling the API
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the storefront session table
    Storefront,
    /// Create the admin session schema and table
    Admin,
    /// Create both
    All,
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Seed {
            file,
            owner,
            dry_run,
        } => commands::seed::run(&file, owner, dry_run).await?,
    }
    Ok(())
}
