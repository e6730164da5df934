mod commands;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use tshare::config::{Config, CONFIG_ENV};
use tshare::logging::{self, LogFormat};

#[derive(Parser)]
#[command(name = "tshare")]
#[command(about = "Split a secret into shares, any k of which recover it", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a secret into shares
    Split {
        /// Shares required to recover the secret
        #[arg(short = 'k', long)]
        threshold: Option<usize>,

        /// Total number of shares to produce
        #[arg(short = 'n', long)]
        shares: Option<usize>,

        /// Print shares as JSON
        #[arg(long)]
        json: bool,

        /// The secret (prompted for, or read from stdin, when omitted)
        secret: Option<String>,
    },

    /// Recover a secret from shares
    #[command(alias = "reconstruct")]
    Combine {
        /// Threshold the shares were dealt with; only used to warn early
        #[arg(short = 'k', long)]
        threshold: Option<usize>,

        /// Shares to combine (read line by line from stdin when omitted)
        shares: Vec<String>,
    },

    /// Write a config file with default threshold parameters
    Init {
        /// Default shares required to recover a secret
        #[arg(short = 'k', long)]
        threshold: Option<usize>,

        /// Default number of shares to produce
        #[arg(short = 'n', long)]
        shares: Option<usize>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the active configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref())?;

    // Init must work even when the existing file is broken
    let config = match cli.command {
        Commands::Init { .. } => Config::default(),
        _ => Config::load(&config_path).context("Failed to load configuration")?,
    };

    logging::init_logging(
        &logging::level_for_verbosity(&config.log_level, cli.verbose),
        cli.log_format,
    );
    tracing::debug!(
        path = %config_path.display(),
        found = config_path.exists(),
        "configuration loaded"
    );

    // Execute the appropriate command
    match cli.command {
        Commands::Split {
            threshold,
            shares,
            json,
            secret,
        } => commands::split(&config, threshold, shares, secret, json)?,
        Commands::Combine { threshold, shares } => commands::combine(threshold, shares)?,
        Commands::Init {
            threshold,
            shares,
            force,
        } => commands::init(&config_path, threshold, shares, force)?,
        Commands::Config => commands::show_config(&config_path, &config)?,
    }

    Ok(())
}
