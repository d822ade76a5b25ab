//! kiosk CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! kiosk-cli migrate
//!
//! # Create an admin user
//! kiosk-cli admin create -e admin@example.com -p "s3cure-pass" -f Admin -l User
//!
//! # Seed the catalog with sample categories and products
//! kiosk-cli seed
//!
//! # Re-sign a captured webhook body and deliver it to a running server
//! kiosk-cli webhook replay -f event.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Bootstrap an admin user
//! - `seed` - Seed sample catalog data
//! - `webhook replay` - Sign and deliver a webhook payload

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kiosk-cli")]
#[command(author, version, about = "kiosk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with sample catalog data
    Seed,
    /// Webhook utilities
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (falls back to SEED_ADMIN_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,

        /// First name
        #[arg(short, long, default_value = "Admin")]
        first_name: String,

        /// Last name
        #[arg(short, long, default_value = "User")]
        last_name: String,
    },
}

#[derive(Subcommand)]
enum WebhookAction {
    /// Sign a payload file and POST it to a running server
    Replay {
        /// Path to the JSON event body
        #[arg(short, long)]
        file: String,

        /// Target server base URL
        #[arg(short, long, default_value = "http://127.0.0.1:3000")]
        url: String,
    },
    /// Print the signature header for a payload file
    Sign {
        /// Path to the JSON event body
        #[arg(short, long)]
        file: String,
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                first_name,
                last_name,
            } => {
                commands::admin::create_user(&email, password.as_deref(), &first_name, &last_name)
                    .await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
        Commands::Webhook { action } => match action {
            WebhookAction::Replay { file, url } => {
                commands::webhook::replay(&file, &url).await?;
            }
            WebhookAction::Sign { file } => {
                commands::webhook::sign(&file).await?;
            }
        },
    }
    Ok(())
}
