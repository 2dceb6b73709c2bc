//! Nodal CLI - Command line interface for the graph store

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, edge, neighbors, node, stats};
use config::Config;
use nodal_mcp::McpServer;
use nodal_storage::{BackendKind, Store, StoreConfig};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "nodal")]
#[command(author, version, about = "Embedded property graph store")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "NODAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage backend: redb, sqlite, memory
    #[arg(short, long, global = true)]
    pub backend: Option<BackendKind>,

    /// Output format: table, json
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Config file
    #[arg(long, global = true, env = "NODAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::default_config_path)
    }

    /// Flags over config file over defaults
    pub fn settings(&self, config: &Config) -> Settings {
        Settings {
            data_dir: self
                .data_dir
                .clone()
                .or_else(|| config.data_dir.clone())
                .unwrap_or_else(config::default_data_dir),
            backend: self.backend.or(config.backend).unwrap_or_default(),
            format: self.format.or(config.format).unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage nodes
    Node(node::NodeArgs),
    /// Manage edges
    Edge(edge::EdgeArgs),
    /// List the edges around a node
    Neighbors(neighbors::NeighborsArgs),
    /// Show node and edge counts
    Stats,
    /// Start MCP server
    Serve,
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Resolved settings for a run
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub backend: BackendKind,
    pub format: OutputFormat,
}

impl Settings {
    pub fn store_config(&self) -> StoreConfig {
        match self.backend {
            BackendKind::Memory => StoreConfig::in_memory(),
            kind => StoreConfig {
                storage_path: Some(self.data_dir.join(kind.file_name())),
                backend: kind,
            },
        }
    }
}

/// Application context with the opened store
pub struct AppContext {
    pub store: Arc<Store>,
    pub format: OutputFormat,
}

impl AppContext {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        if settings.backend != BackendKind::Memory {
            std::fs::create_dir_all(&settings.data_dir)?;
        }

        let store_config = settings.store_config();
        tracing::debug!("Using store: {:?}", store_config);
        let store = Store::open(&store_config).await?;

        Ok(Self {
            store: Arc::new(store),
            format: settings.format,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting nodal CLI");

    let config_path = cli.config_path();
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args, &config_path),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load(&config_path)?;
    let settings = cli.settings(&config);
    let ctx = AppContext::new(&settings).await?;

    let result = match &cli.command {
        Commands::Node(args) => node::run(args, &ctx).await,
        Commands::Edge(args) => edge::run(args, &ctx).await,
        Commands::Neighbors(args) => neighbors::run(args, &ctx).await,
        Commands::Stats => stats::run(&ctx).await,
        Commands::Serve => {
            let server = McpServer::new(ctx.store.clone());
            server.run_stdio().await
        }
        Commands::Config(_) | Commands::Completions(_) => Ok(()),
    };

    if let Err(e) = ctx.store.close().await {
        tracing::warn!("Failed to close store: {}", e);
    }
    result
}
