//! # Runtime Module
//!
//! Wiring for the chat service. [`ChatRuntime`] holds the news orchestrator
//! and the model oracle and is shared as axum state; [`serve`] binds the
//! listener and runs until SIGINT or SIGTERM.

/// Chat pipeline: intent, news, prompt, model, validation.
pub mod chat;
/// Environment-based configuration.
pub mod config;
/// HTTP request handlers.
pub mod handlers;
/// Router construction.
pub mod router;
/// Graceful shutdown signal handling.
pub mod shutdown;

pub use chat::{ChatRequest, ChatRuntime};
pub use config::{ChatRuntimeConfig, ChatRuntimeConfigBuilder, OracleConfig, RouterConfig};
pub use dapplink_core::ConfigError;
pub use shutdown::shutdown_signal;

use tokio::net::TcpListener;
use tracing::info;

/// Build the runtime from `config` and serve until a shutdown signal arrives
pub async fn serve(config: ChatRuntimeConfig) -> std::io::Result<()> {
    let runtime = ChatRuntime::from_config(&config);
    let app = runtime.router_with_config(&config.router_config());

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        oracle = config.oracle.backend(),
        static_dir = %config.static_dir.display(),
        "DappLink chat server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("DappLink chat server stopped");
    Ok(())
}
