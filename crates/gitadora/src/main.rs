//! GITADORA skill tracker
//!
//! # Usage
//!
//! ```bash
//! # Run the API server (default)
//! gitadora
//! gitadora serve --config gitadora.toml
//!
//! # Create an account from the shell
//! gitadora user create --email admin@example.com --role admin
//!
//! # Record current totals for every player (run from cron)
//! gitadora snapshot --instrument drum
//! ```

mod cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitadora_config::{Config, LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// GITADORA skill tracker
#[derive(Parser, Debug)]
#[command(name = "gitadora")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true, env = "GITADORA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the API server
    Serve(cmd::serve::ServeArgs),

    /// Manage accounts
    User(cmd::user::UserArgs),

    /// Store a skill snapshot for every player
    Snapshot(cmd::snapshot::SnapshotArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.log, cli.log_level.as_deref())?;

    match cli.command {
        Some(Command::Serve(args)) => cmd::serve::run(config, args).await,
        Some(Command::User(args)) => cmd::user::run(config, args).await,
        Some(Command::Snapshot(args)) => cmd::snapshot::run(config, args).await,
        // No subcommand = run server
        None => cmd::serve::run(config, cmd::serve::ServeArgs::default()).await,
    }
}

/// Load the config file, or defaults when none was given
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path
        && !path.exists()
    {
        anyhow::bail!("config file not found: {}", path.display());
    }

    Config::load(path).with_context(|| match path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to build default config".to_string(),
    })
}

/// Initialize the tracing subscriber
///
/// Level: CLI flag > `[log].level` > "info", followed by `[log].targets`.
fn init_logging(config: &LogConfig, cli_level: Option<&str>) -> Result<()> {
    let directive = config.filter_directive(cli_level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {:?}", directive))?;

    let writer = match &config.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(std::sync::Arc::new(file))
        }
    };

    let layer = match config.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();

    Ok(())
}
