use clap::{Parser, Subcommand};
use dapplink_core::ConfigError;
use dapplink_http::ChatRuntimeConfigBuilder;
use dapplink_mcp::{McpError, NewsToolServer};
use dapplink_tools::{NewsFeed, NewsFeedConfig};
use thiserror::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dapplink", version)]
#[command(about = "DappLink chat server and crypto news tool worker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the chat HTTP server
    Serve {
        /// Bind address (overrides HOST)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the crypto news MCP server on stdin/stdout
    McpServer,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli.command);

    let outcome = match cli.command {
        Commands::Serve { host, port } => serve(host, port).await,
        Commands::McpServer => mcp_server().await,
    };

    if let Err(e) = outcome {
        error!(error = %e, "dapplink exited with an error");
        std::process::exit(1);
    }
}

/// `RUST_LOG` when set and valid, `info` otherwise
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize JSON logging once. The worker's stdout carries the protocol.
fn init_logging(command: &Commands) {
    let builder = tracing_subscriber::fmt().with_env_filter(log_filter()).json();
    let _ = match command {
        Commands::McpServer => builder.with_writer(std::io::stderr).try_init(),
        Commands::Serve { .. } => builder.try_init(),
    };
}

async fn serve(host: Option<String>, port: Option<u16>) -> Result<(), CliError> {
    let mut builder = ChatRuntimeConfigBuilder::from_env()?;
    if let Some(host) = host {
        builder = builder.host(host);
    }
    if let Some(port) = port {
        builder = builder.port(port);
    }

    dapplink_http::serve(builder.build()?).await?;
    Ok(())
}

async fn mcp_server() -> Result<(), CliError> {
    let feed = NewsFeed::new(NewsFeedConfig::from_env()?);
    NewsToolServer::new(feed).serve_stdio().await?;
    Ok(())
}
