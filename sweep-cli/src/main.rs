//! gha-sweep CLI - bulk-edit GitHub Actions workflows
//!
//! Sweeps every repository of a user or organization, applying one workflow
//! mutation per run: disable all existing workflow files, or install the
//! FOSSA scan workflow.

mod commands;

use clap::{Parser, Subcommand};
use sweep_core::{Config, DisableWorkflows, EnableFossaWorkflow, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CleanArgs, SweepArgs};

/// Bulk-edit GitHub Actions workflows across an account's repositories
#[derive(Parser, Debug)]
#[command(name = "gha-sweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Overwrite every workflow file with a disabled marker
    Disable(SweepArgs),

    /// Install the FOSSA scan workflow in every repository
    Enable(SweepArgs),

    /// Remove leftover mirror directories from interrupted runs
    Clean(CleanArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("gha-sweep {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Disable(args)) => {
            args.execute(&DisableWorkflows, cli.verbose).await?;
        }
        Some(Commands::Enable(args)) => {
            args.execute(&EnableFossaWorkflow, cli.verbose).await?;
        }
        Some(Commands::Clean(args)) => {
            args.execute()?;
        }
        Some(Commands::Config) => {
            let config = Config::load()?.with_env_overrides();
            let sweep = &config.sweep;

            println!("gha-sweep Configuration");
            println!("=======================");
            println!();
            println!("Sweep Settings:");
            println!("  identity:   {}", sweep.identity.as_deref().unwrap_or("(not set)"));
            println!("  page_size:  {}", sweep.page_size);
            println!("  local_root: {}", sweep.local_root.display());
            println!("  delay:      {:?}", sweep.delay);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
            if let Some(path) = Secrets::default_secrets_path() {
                println!("Secrets file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found)");
                }
            }
        }
        None => {
            println!("gha-sweep - bulk-edit GitHub Actions workflows");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
