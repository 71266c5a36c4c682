//! `meditate` command-line entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use meditate_rs::config::{Credentials, MeditateConfig};
use meditate_rs::core::MeditationStore;
use meditate_rs::server;
use std::path::{Path, PathBuf};

/// Personalized guided-meditation generation service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// JSON5 config file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Bind address, overriding the config and MEDITATE_BIND
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Drop and recreate the meditation database
    ResetDb {
        /// JSON5 config file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    meditate_rs::init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config, bind } => run_server(config.as_deref(), bind).await,
        Commands::ResetDb { config } => reset_db(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<MeditateConfig> {
    MeditateConfig::load(path).with_context(|| match path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "invalid default configuration".to_string(),
    })
}

async fn run_server(config_path: Option<&Path>, bind: Option<String>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let credentials =
        Credentials::from_env().context("provider credentials are required to start")?;
    let state = meditate_rs::build_state(&config, credentials)
        .context("failed to assemble the meditation service")?;
    server::serve(&config.server.bind, state)
        .await
        .context("meditation server failed")?;
    Ok(())
}

fn reset_db(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = meditate_rs::open_store(&config).context("failed to open database")?;
    store.reset().context("failed to reset database")?;
    info!(
        "database reset (database_url={})",
        config.storage.database_url
    );
    Ok(())
}
