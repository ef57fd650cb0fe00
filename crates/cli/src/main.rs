//! DreamNex CLI - database management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! dreamnex-cli migrate run
//!
//! # Show which migrations have been applied
//! dreamnex-cli migrate status
//! ```
//!
//! # Commands
//!
//! - `migrate run` - Apply pending database migrations
//! - `migrate status` - List known migrations and whether they are applied

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dreamnex-cli")]
#[command(author, version, about = "DreamNex CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Run,
    /// List migrations and whether they have been applied
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::migrate::MigrationError> {
    match cli.command {
        Commands::Migrate { action } => match action {
            MigrateAction::Run => commands::migrate::run().await,
            MigrateAction::Status => commands::migrate::status().await,
        },
    }
}
