//! llmd CLI: the main entry point.
//!
//! Commands:
//! - `run`: ask the model about a project log and apply its patches
//! - `apply`: apply the patches in a saved reply, offline
//! - `check`: verify a project log parses and round-trips exactly
//! - `init`: write an empty project log
//! - `providers`: list configured providers, optionally checking each one
//! - `config`: show the effective configuration or its path

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "llmd",
    about = "llmd: converse with a language model inside a Markdown project log",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.llmd/config.toml
    #[arg(long, global = true, value_name = "PATH", env = "LLMD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a reply to the newest user message and apply its patches
    Run {
        /// The project log
        file: PathBuf,

        /// Append this as a new user message first
        #[arg(short, long)]
        message: Option<String>,

        /// Provider name (defaults to `default_provider`)
        #[arg(long)]
        provider: Option<String>,

        /// Model name (defaults to the provider's configured model)
        #[arg(long)]
        model: Option<String>,

        /// Print the updated log instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Record a saved reply as the assistant's answer and apply its patches
    Apply {
        /// The project log
        file: PathBuf,

        /// File holding the reply text
        #[arg(long, value_name = "REPLY_FILE")]
        reply: PathBuf,

        /// Print the updated log instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that a project log parses and writes back byte for byte
    Check {
        /// The project log
        file: PathBuf,
    },

    /// Create a new, empty project log
    Init {
        /// Where to write it
        file: PathBuf,

        /// Project name for the root heading
        #[arg(long)]
        name: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List configured providers
    Providers {
        /// Contact each provider and list its models
        #[arg(long)]
        check: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (keys redacted)
    Show,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output only.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            file,
            message,
            provider,
            model,
            dry_run,
        } => {
            let options = commands::run::RunOptions {
                message,
                provider,
                model,
                dry_run,
            };
            commands::run::run(&file, config_path, options).await?
        }
        Commands::Apply {
            file,
            reply,
            dry_run,
        } => commands::apply::run(&file, &reply, config_path, dry_run)?,
        Commands::Check { file } => commands::check::run(&file)?,
        Commands::Init { file, name, force } => commands::init::run(&file, &name, force)?,
        Commands::Providers { check } => commands::providers::run(config_path, check).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path)?,
            ConfigAction::Path => commands::config_cmd::path(config_path),
        },
    }

    Ok(())
}
