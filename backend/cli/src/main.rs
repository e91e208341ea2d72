mod call_cmd;
mod config;
mod operations_cmd;
mod status_cmd;
mod terminal_output;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use forumlink_agent::ReqwestTransport;
use forumlink_config::{ForumLinkConfig, ForumSettings, redacted_config};
use forumlink_config::defaults::DEFAULT_PORT;
use forumlink_gateway::{GatewayState, SessionRegistry, start_server};
use forumlink_logging::{LoggerOptions, init_logger};

use terminal_output::note_info;

#[derive(Parser)]
#[command(name = "forumlink")]
#[command(about = "ForumLink: session-scoped, read-only Discourse agent")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP gateway
    Serve {
        /// Path to config.yaml (defaults to the ForumLink config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Query a running gateway's health
    Status {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// List available operations and their parameters
    Operations {
        /// Print MCP tool descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one operation against a fresh session and print the result
    Call {
        /// Operation name, e.g. get_latest_topics
        operation: String,
        /// Parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port } => {
            let mut config = config::load(config.as_deref()).await?;
            if let Some(port) = port {
                config.gateway_mut().port = Some(port);
            }
            init_logger(&config::logger_options(&config));
            run_server(config).await?;
        }
        Commands::Status { port } => {
            status_cmd::run(port).await?;
        }
        Commands::Operations { json } => {
            operations_cmd::run(json)?;
        }
        Commands::Call {
            operation,
            params,
            config,
        } => {
            init_logger(&LoggerOptions {
                level: "warn".into(),
                ..LoggerOptions::default()
            });
            if !call_cmd::run(&operation, params.as_deref(), config.as_deref()).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run_server(config: ForumLinkConfig) -> Result<()> {
    let settings = ForumSettings::from_config(&config)?;
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid gateway bind address: {}", config.bind_address()))?;

    info!(
        addr = %addr,
        base_url = %settings.base_url,
        cache_ttl_secs = settings.cache_ttl.as_secs(),
        session_idle_secs = config.session_idle_secs(),
        "Starting ForumLink gateway"
    );
    tracing::debug!(config = %redacted_config(&config), "Effective configuration");

    let transport = Arc::new(ReqwestTransport::new(settings.timeout)?);
    let sessions = SessionRegistry::new(settings, transport)
        .with_idle_timeout(Duration::from_secs(config.session_idle_secs()));

    note_info(&format!("MCP endpoint: http://{addr}/mcp (WebSocket: ws://{addr}/ws)"));
    start_server(addr, GatewayState::new(sessions)).await
}
