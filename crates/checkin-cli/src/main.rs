// ============================================================================
// carnival-checkin — daily check-in runner for the Carnival portal
// ============================================================================
// Usage:
//   carnival-checkin claim --accounts accounts.json    Claim today's stamp
//   carnival-checkin stats --accounts accounts.json    Print check-in history
//
// The accounts file maps wallet seed -> proxy setting:
//   { "seed one": false,
//     "seed two": {"host": "10.0.0.1", "port": 8080, "username": "u",
//                  "password": "p", "scheme": "socks5"} }
// ============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use checkin_core::config::PortalConfig;
use checkin_core::runner;
use checkin_core::types::ProxySetting;

/// Carnival portal daily check-in automation
#[derive(Parser)]
#[command(name = "carnival-checkin", version, about = "Claim the Carnival daily check-in stamp per wallet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the claim sequence for every account in the mapping
    Claim {
        /// Path to the seed -> proxy accounts file (JSON)
        #[arg(long, default_value = "accounts.json")]
        accounts: PathBuf,
    },

    /// Report check-in history for every account in the mapping
    Stats {
        /// Path to the seed -> proxy accounts file (JSON)
        #[arg(long, default_value = "accounts.json")]
        accounts: PathBuf,
    },
}

fn load_accounts(path: &Path) -> Result<HashMap<String, ProxySetting>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read accounts file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse accounts file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("checkin_core=info".parse().unwrap())
                .add_directive("checkin_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = PortalConfig::from_env()?;

    match cli.command {
        Commands::Claim { accounts } => {
            let accounts = load_accounts(&accounts)?;
            info!("Starting claim run for {} account(s)", accounts.len());
            runner::run_batch(&config, &accounts).await;
        }
        Commands::Stats { accounts } => {
            let accounts = load_accounts(&accounts)?;
            runner::run_stats(&config, &accounts).await;
        }
    }

    Ok(())
}
