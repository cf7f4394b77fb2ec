//! CLI administration tool for user-management.
//!
//! Reads and edits user records directly against the configured storage
//! backend, without going through the HTTP API. The same rules apply as over
//! HTTP: create refuses an existing username, update and delete refuse a
//! missing one.
//!
//! # Usage
//!
//! ```bash
//! # Create a user
//! cargo run --bin admin -- user create john -a email=j@example.com -a age=30
//!
//! # Show a user
//! cargo run --bin admin -- user get john
//!
//! # Patch attributes
//! cargo run --bin admin -- user update john -a email=new@example.com
//!
//! # Delete a user (asks for confirmation)
//! cargo run --bin admin -- user delete john
//!
//! # Check the storage backend
//! cargo run --bin admin -- store check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `STORAGE_BACKEND` plus the selected backend's settings
//! (see `user_management::config`).

use user_management::api::dto::user::validate_username;
use user_management::application::services::UserService;
use user_management::config::{Config, StorageConfig};
use user_management::domain::entities::{Attributes, User};
use user_management::infrastructure::persistence;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use serde_json::Value;

/// CLI tool for managing user records.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user records
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Storage backend operations
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

/// User record subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Show a user record
    Get { username: String },

    /// Create a user record
    Create {
        username: String,

        /// Attribute as key=value (value parsed as JSON when possible)
        #[arg(short = 'a', long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, Value)>,
    },

    /// Overwrite attributes of an existing user record
    Update {
        username: String,

        /// Attribute as key=value (value parsed as JSON when possible)
        #[arg(short = 'a', long = "attr", value_parser = parse_attribute, required = true)]
        attributes: Vec<(String, Value)>,
    },

    /// Delete a user record
    Delete {
        username: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Storage subcommands.
#[derive(Subcommand)]
enum StoreAction {
    /// Check backend connectivity
    Check,

    /// Show the configured backend
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    match cli.command {
        Commands::User { action } => {
            let service = connect_service(&config).await?;
            handle_user_action(action, &service).await?
        }
        Commands::Store { action } => handle_store_action(action, &config).await?,
    }

    Ok(())
}

/// Connects to the configured backend and wraps it in a [`UserService`].
async fn connect_service(config: &Config) -> Result<UserService> {
    let store = persistence::connect(&config.storage)
        .await
        .context("Failed to connect to storage backend")?;
    Ok(UserService::with_timeout(store, config.store_timeout()))
}

/// Dispatches user record commands.
async fn handle_user_action(action: UserAction, service: &UserService) -> Result<()> {
    match action {
        UserAction::Get { username } => {
            let user = service
                .get(&username)
                .await?
                .with_context(|| format!("User {username} does not exist"))?;
            print_user(&user)?;
        }
        UserAction::Create {
            username,
            attributes,
        } => {
            check_username(&username)?;
            if service.get(&username).await?.is_some() {
                anyhow::bail!("User {username} already exists");
            }
            let user = service.create(&username, collect(attributes)).await?;
            println!("{}", "✅ User created".green().bold());
            print_user(&user)?;
        }
        UserAction::Update {
            username,
            attributes,
        } => {
            let user = service
                .update(&username, collect(attributes))
                .await?
                .with_context(|| format!("User {username} does not exist"))?;
            println!("{}", "✅ User updated".green().bold());
            print_user(&user)?;
        }
        UserAction::Delete { username, yes } => delete_user(service, username, yes).await?,
    }

    Ok(())
}

/// Deletes a user after confirmation (default: No).
async fn delete_user(service: &UserService, username: String, skip_confirm: bool) -> Result<()> {
    let user = service
        .get(&username)
        .await?
        .with_context(|| format!("User {username} does not exist"))?;

    println!("{}", "🗑  Delete user".bright_blue().bold());
    println!();
    print_user(&user)?;
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete user {username}?"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service.delete(&username).await?;
    println!("{}", format!("✅ User {username} was deleted").green().bold());

    Ok(())
}

/// Handles storage diagnostic commands.
async fn handle_store_action(action: StoreAction, config: &Config) -> Result<()> {
    match action {
        StoreAction::Check => {
            let service = connect_service(config).await?;
            println!(
                "{}",
                format!("🔍 Checking {} backend...", service.backend_name()).bright_blue()
            );
            service.health_check().await?;
            println!("{}", "✅ Storage backend OK".green().bold());
        }
        StoreAction::Info => show_store_info(&config.storage),
    }

    Ok(())
}

fn show_store_info(storage: &StorageConfig) {
    println!("{}", "ℹ️  Storage backend".bright_blue().bold());
    println!();
    println!("  Backend: {}", storage.backend_name().bright_white());

    match storage {
        StorageConfig::Memory => {
            println!("  {}", "Records live in process memory only".yellow());
        }
        StorageConfig::Postgres(pg) => {
            println!(
                "  Database: {}",
                user_management::config::mask_connection_string(&pg.database_url).cyan()
            );
        }
        StorageConfig::Redis(redis) => {
            println!(
                "  Redis:    {}",
                user_management::config::mask_connection_string(&redis.redis_url).cyan()
            );
            println!("  Prefix:   {}", redis.key_prefix.cyan());
        }
        StorageConfig::DynamoDb(dynamo) => {
            println!("  Table:    {}", dynamo.table_name.cyan());
            if let Some(ref region) = dynamo.region {
                println!("  Region:   {}", region.cyan());
            }
            if let Some(ref endpoint) = dynamo.endpoint_url {
                println!("  Endpoint: {}", endpoint.cyan());
            }
        }
    }
    println!();
}

/// Applies the same username rule as `POST /users`.
fn check_username(username: &str) -> Result<()> {
    validate_username(username).map_err(|e| {
        anyhow::anyhow!(
            "Invalid username: {}",
            e.message.as_deref().unwrap_or("username is invalid")
        )
    })
}

fn print_user(user: &User) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(user)?);
    Ok(())
}

fn collect(attributes: Vec<(String, Value)>) -> Attributes {
    attributes.into_iter().collect()
}

/// Parses `key=value`; the value is JSON if it parses, otherwise a string.
fn parse_attribute(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;

    if key.is_empty() {
        return Err(format!("attribute name is empty in '{raw}'"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
