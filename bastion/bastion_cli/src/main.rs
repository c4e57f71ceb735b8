use anyhow::{Context, Result};
use bastion_core::EditorConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod console;

use commands::policy::{DeleteArgs, ListArgs, SaveArgs, ValidateArgs};

/// Bastion policy editor
///
/// Validates access policies and stores them in a policy directory.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Policy directory, overriding the configured one
    #[clap(long, global = true)]
    store_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a policy document without storing it
    Validate(ValidateArgs),

    /// Validate and store a policy document
    Save(SaveArgs),

    /// Delete a stored policy
    Delete(DeleteArgs),

    /// List the stored policies of a service
    List(ListArgs),
}

fn init_logging(config: &EditorConfig) -> Result<()> {
    let level = config.log_level()?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = EditorConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(store_dir) = cli.store_dir {
        config.store_dir = store_dir;
    }
    init_logging(&config)?;

    let succeeded = match cli.command {
        Commands::Validate(args) => commands::policy::execute_validate(&args)?,
        Commands::Save(args) => commands::policy::execute_save(&args, config).await?,
        Commands::Delete(args) => commands::policy::execute_delete(&args, config).await?,
        Commands::List(args) => commands::policy::execute_list(&args, &config).await?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
