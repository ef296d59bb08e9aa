//! CLI administration tool for snip.
//!
//! Provides commands for managing user accounts, viewing statistics,
//! and performing database operations without going through the web UI.
//!
//! # Usage
//!
//! ```bash
//! # Create a user account (prompts for the password)
//! cargo run --bin admin -- user create alice
//!
//! # Create a staff account
//! cargo run --bin admin -- user create alice --staff
//!
//! # List all accounts
//! cargo run --bin admin -- user list
//!
//! # Grant or revoke the staff flag
//! cargo run --bin admin -- user set-staff alice
//! cargo run --bin admin -- user set-staff alice --revoke
//!
//! # Deactivate an account
//! cargo run --bin admin -- user deactivate alice
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use snip::application::services::AuthService;
use snip::domain::entities::NewUser;
use snip::domain::repositories::{ShortUrlRepository, UserRepository};
use snip::infrastructure::persistence::{PgShortUrlRepository, PgUserRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing snip.
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
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Username for the new account
        username: String,

        /// Mark the account as staff
        #[arg(long)]
        staff: bool,
    },

    /// List all accounts
    List,

    /// Grant (or revoke) the staff flag
    SetStaff {
        /// Username of the account
        username: String,

        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },

    /// Deactivate an account
    Deactivate {
        /// Username of the account
        username: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgUserRepository::new(Arc::new(pool.clone())));

    match action {
        UserAction::Create { username, staff } => {
            create_user(repo, username, staff).await?;
        }
        UserAction::List => {
            list_users(repo).await?;
        }
        UserAction::SetStaff { username, revoke } => {
            set_staff(repo, username, !revoke).await?;
        }
        UserAction::Deactivate { username } => {
            deactivate_user(repo, username).await?;
        }
    }

    Ok(())
}

/// Creates a new account with an interactive password prompt.
///
/// The password is hashed with Argon2; only the hash is stored.
async fn create_user(repo: Arc<PgUserRepository>, username: String, staff: bool) -> Result<()> {
    println!("{}", "Create account".bright_blue().bold());
    println!();

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let password_hash = AuthService::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let user = repo
        .create(NewUser {
            username,
            password_hash: Some(password_hash),
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create account: {}", e))?;

    if staff && !repo.set_staff(user.id, true).await? {
        anyhow::bail!("Failed to mark account as staff");
    }

    println!();
    println!("{}", "Account created successfully!".green().bold());
    println!("  Username: {}", user.username.cyan());
    println!("  ID:       {}", user.id.to_string().bright_black());
    if staff {
        println!("  Staff:    {}", "yes".bright_yellow());
    }
    println!();

    Ok(())
}

/// Lists all accounts with status indicators.
async fn list_users(repo: Arc<PgUserRepository>) -> Result<()> {
    println!("{}", "Accounts".bright_blue().bold());
    println!();

    let users = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list accounts: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No accounts found".yellow());
        println!();
        println!(
            "  Create one with: {} admin user create <username>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<30} {:<20} {:<8} {:<10}",
        "ID".bright_white().bold(),
        "Username".bright_white().bold(),
        "Created".bright_white().bold(),
        "Staff".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(78).bright_black());

    for user in &users {
        let status = if user.is_active {
            "ACTIVE".green()
        } else {
            "INACTIVE".red()
        };

        let staff = if user.is_staff { "yes" } else { "" };

        println!(
            "  {:<5} {:<30} {:<20} {:<8} {}",
            user.id.to_string().bright_black(),
            user.username.cyan(),
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            staff.bright_yellow(),
            status
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Grants or revokes the staff flag with a confirmation prompt.
async fn set_staff(repo: Arc<PgUserRepository>, username: String, staff: bool) -> Result<()> {
    let action = if staff { "Grant staff" } else { "Revoke staff" };
    println!("{}", action.bright_blue().bold());
    println!();

    let user = repo
        .find_by_username(&username)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Account not found")?;

    if user.is_staff == staff {
        println!("{}", "Nothing to change".yellow());
        return Ok(());
    }

    println!("  Username: {}", user.username.cyan());
    println!("  ID:       {}", user.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt(format!("{} for this account?", action))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    if !repo.set_staff(user.id, staff).await? {
        anyhow::bail!("Account disappeared while updating");
    }

    println!();
    println!("{}", "Account updated successfully!".green().bold());
    println!();

    Ok(())
}

/// Deactivates an account with a confirmation prompt.
async fn deactivate_user(repo: Arc<PgUserRepository>, username: String) -> Result<()> {
    println!("{}", "Deactivate account".bright_blue().bold());
    println!();

    let user = repo
        .find_by_username(&username)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Account not found")?;

    if !user.is_active {
        println!("{}", "This account is already inactive".yellow());
        return Ok(());
    }

    println!("  Username: {}", user.username.cyan());
    println!("  ID:       {}", user.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Deactivate this account?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    if !repo.set_active(user.id, false).await? {
        anyhow::bail!("Account disappeared while updating");
    }

    println!();
    println!("{}", "Account deactivated successfully!".green().bold());
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Number of accounts
/// - Number of short URLs
/// - Total recorded clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let users = PgUserRepository::new(pool.clone());
    let short_urls = PgShortUrlRepository::new(pool);

    let users_count = users.count().await?;
    let short_urls_count = short_urls.count().await?;
    let clicks_count = short_urls.total_clicks().await?;

    println!(
        "  Accounts:   {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Short URLs: {}",
        short_urls_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:     {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
