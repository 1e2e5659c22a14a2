//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod audit;
pub mod config;
pub mod feed;
pub mod input;
pub mod thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

use ct_core::config::{Config, DEFAULT_CONFIG_PATH};
use ct_core::feed::FeedManager;
use ct_storage::FileSystemStorage;

/// catch-thread - threaded comments for catch feeds
#[derive(Debug, Parser)]
#[command(name = "catch-thread")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Feed storage directory
    #[arg(long, global = true, env = "CATCH_THREAD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build and render the reply tree of a comment snapshot
    Thread(thread::ThreadArgs),

    /// Check a comment snapshot for broken reply links
    Audit(audit::AuditArgs),

    /// Manage stored comment feeds
    #[command(subcommand)]
    Feed(feed::FeedCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Full JSON with nested replies
    Json,
    /// Compact JSON with short keys
    JsonCompact,
    /// Markdown nested list
    Markdown,
    /// Indented plain text
    Text,
}

impl ExportFormat {
    /// Name registered with the export manager
    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::JsonCompact => "json-compact",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
        }
    }
}

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Configuration file to read
    pub config_path: PathBuf,
    /// Storage directory override
    pub data_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Load the configuration, defaults when the file is missing
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(&self.config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                self.config_path.display()
            )
        })
    }

    /// Resolve the feed directory: flag, then config, then platform default
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| config.storage.data_dir.clone())
            .unwrap_or_else(FileSystemStorage::default_dir)
    }

    /// Open the feed store
    pub fn feed_manager(&self, config: &Config) -> Result<FeedManager> {
        let dir = self.data_dir(config);
        debug!("Opening feed storage at {:?}", dir);
        let storage = FileSystemStorage::new(&dir)
            .with_context(|| format!("Failed to open feed storage at {}", dir.display()))?;
        Ok(FeedManager::new(storage))
    }
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let options = GlobalOptions {
        config_path: cli
            .config
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        data_dir: cli.data_dir,
    };

    match cli.command {
        Commands::Thread(args) => thread::execute(args, &options),
        Commands::Audit(args) => audit::execute(args),
        Commands::Feed(cmd) => feed::execute(cmd, &options),
        Commands::Config(cmd) => config::execute(cmd, &options),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
