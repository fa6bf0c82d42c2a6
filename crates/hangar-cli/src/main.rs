//! Hangar CLI - Deployment preflight for machine fleets
//!
//! This CLI lets operators check a deployment before anything changes:
//! - Resolve the effective configuration, image and rollout strategy
//! - Refuse fleets with unmanaged machines or drifted volume mounts
//! - Show the reservable volumes per process group
//!
//! It runs against a recorded control-plane snapshot; nothing is mutated.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

use commands::preflight;
use config::CliConfig;

/// Hangar CLI application
#[derive(Parser)]
#[command(name = "hangar")]
#[command(about = "Hangar - Machine deployment preflight", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "HANGAR_CONFIG")]
    config: Option<String>,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable JSON logging
    #[arg(long, env = "HANGAR_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Validate a deployment against a recorded fleet snapshot
    Preflight(preflight::PreflightArgs),

    /// List recognized machine sizes
    Sizes,

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config
    let config = CliConfig::load(cli.config.as_deref())?;

    // Initialize tracing; logs go to stderr so stdout stays machine-readable
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.log_json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    // Execute command
    match cli.command {
        Commands::Preflight(args) => preflight::execute(args, &config, cli.output).await,
        Commands::Sizes => output::print_sizes(cli.output),
        Commands::Config => {
            println!("Config file: {:?}", cli.config);
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
