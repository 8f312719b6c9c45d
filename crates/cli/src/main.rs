//! ebookstore CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ebookstore-cli migrate
//!
//! # Create a dispatcher
//! ebookstore-cli user create -e otieno@example.com -p 'correct horse' --group dispatchers
//!
//! # Load the sample catalog
//! ebookstore-cli seed crates/cli/fixtures/catalog.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ebookstore_storefront::services::images;

mod commands;

#[derive(Parser)]
#[command(name = "ebookstore-cli")]
#[command(author, version, about = "ebookstore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Upsert tags, books and book images from a YAML fixture
    Seed {
        /// Path to the fixture file
        fixture: String,

        /// Directory served at /media by the storefront
        #[arg(long, default_value = images::DEFAULT_MEDIA_ROOT)]
        media_root: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,

        /// Allow back-office sign-in
        #[arg(long)]
        staff: bool,

        /// Shop owner with every permission
        #[arg(long)]
        superuser: bool,

        /// Staff group (`employees`, `dispatchers`); repeatable
        #[arg(short, long = "group")]
        groups: Vec<String>,
    },
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

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                first_name,
                last_name,
                staff,
                superuser,
                groups,
            } => {
                commands::user::create(commands::user::CreateUser {
                    email,
                    password,
                    first_name,
                    last_name,
                    staff,
                    superuser,
                    groups,
                })
                .await?;
            }
        },
        Commands::Seed {
            fixture,
            media_root,
        } => commands::seed::catalog(&fixture, &media_root).await?,
    }
    Ok(())
}
