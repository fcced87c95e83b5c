//! CLI administration tool for url-watch.
//!
//! Works directly against the Redis entry store, without going through the
//! HTTP API. Entries added here are not announced to live watchers.
//!
//! # Usage
//!
//! ```bash
//! # Store a URL
//! cargo run --bin admin -- add example.com/some/page
//!
//! # Look up and delete an entry
//! cargo run --bin admin -- get aZ3kQ9
//! cargo run --bin admin -- delete aZ3kQ9
//!
//! # Count stored entries
//! cargo run --bin admin -- count
//!
//! # Check or empty the database
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db flush
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL`, or `REDIS_HOST` / `REDIS_PORT` / `REDIS_PASSWORD` / `REDIS_DB`

use url_watch::config::{Config, mask_connection_string};
use url_watch::domain::repositories::EntryStore;
use url_watch::infrastructure::persistence::RedisEntryStore;
use url_watch::utils::short_id::validate_short_id;
use url_watch::utils::url_normalizer::normalize_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing url-watch entries.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Store a URL (or show the existing entry for it)
    Add {
        /// URL to store; `https://` is assumed when no scheme is given
        url: String,
    },

    /// Show the entry stored under an id
    Get { id: String },

    /// Delete an entry
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the number of stored entries
    Count,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check the Redis connection
    Check,

    /// Delete every key in the configured database
    Flush,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let store = RedisEntryStore::connect(&config.redis_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to Redis at {}",
                mask_connection_string(&config.redis_url)
            )
        })?;

    let result = match cli.command {
        Commands::Add { url } => add_entry(&store, &url).await,
        Commands::Get { id } => get_entry(&store, &id).await,
        Commands::Delete { id, yes } => delete_entry(&store, &id, yes).await,
        Commands::Count => count_entries(&store).await,
        Commands::Db { action } => handle_db_action(action, &store, &config).await,
    };

    store.close().await?;
    result
}

/// Normalizes and stores a URL.
async fn add_entry(store: &RedisEntryStore, raw_url: &str) -> Result<()> {
    println!("{}", "📝 Add Entry".bright_blue().bold());
    println!();

    let url = normalize_url(raw_url).context("Invalid URL")?;

    let entry = store
        .add_entry(&url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to store entry: {}", e))?;

    println!("  ID:   {}", entry.id.bright_yellow().bold());
    println!("  URL:  {}", entry.url.cyan());
    println!("  Hash: {}", entry.hash.bright_black());
    println!();

    Ok(())
}

/// Prints the entry stored under an id.
async fn get_entry(store: &RedisEntryStore, id: &str) -> Result<()> {
    validate_short_id(id)?;

    let entry = store
        .get_entry(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    match entry {
        Some(entry) => {
            println!("  ID:   {}", entry.id.bright_yellow().bold());
            println!("  URL:  {}", entry.url.cyan());
            println!("  Hash: {}", entry.hash.bright_black());
        }
        None => println!("{}", format!("⚠️  No entry with id {}", id).yellow()),
    }

    Ok(())
}

/// Deletes an entry after showing it.
///
/// Requires confirmation (default: No) unless `--yes` is given.
async fn delete_entry(store: &RedisEntryStore, id: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Entry".bright_blue().bold());
    println!();

    validate_short_id(id)?;

    let entry = store
        .get_entry(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Entry not found")?;

    println!("  ID:  {}", entry.id.bright_yellow());
    println!("  URL: {}", entry.url.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this entry?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    store
        .delete_entry(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete entry: {}", e))?;

    println!("{}", "✅ Entry deleted".green().bold());
    println!();

    Ok(())
}

async fn count_entries(store: &RedisEntryStore) -> Result<()> {
    let count = store
        .count_entries()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count entries: {}", e))?;

    println!("  Entries: {}", count.to_string().bright_green().bold());

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(
    action: DbAction,
    store: &RedisEntryStore,
    config: &Config,
) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking Redis connection...".bright_blue());

            if !store.health_check().await {
                anyhow::bail!("Redis did not answer PING");
            }

            println!("{}", "✅ Redis connection OK".green().bold());
            println!("  {}", mask_connection_string(&config.redis_url).bright_black());
        }
        DbAction::Flush => {
            println!(
                "{}",
                format!(
                    "⚠️  This deletes every key in {}",
                    mask_connection_string(&config.redis_url)
                )
                .red()
                .bold()
            );

            let confirmed = Confirm::new()
                .with_prompt("Flush the database?")
                .default(false)
                .interact()?;

            if !confirmed {
                println!("{}", "❌ Cancelled".red());
                return Ok(());
            }

            store
                .flush()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to flush database: {}", e))?;

            println!("{}", "✅ Database flushed".green().bold());
        }
    }

    Ok(())
}
