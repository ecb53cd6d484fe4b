//! # DappLink MCP - news tool process and fallback chain
//!
//! This crate runs the `fetch_crypto_news` tool in a separate worker process
//! and talks to it over the Model Context Protocol on stdio.
//!
//! ## Features
//!
//! - **MCP Server**: the worker side, exposing one news tool
//! - **Tool Session**: lazily spawned, shared client connection to the worker
//! - **Orchestrator**: tool process, then direct feed, then a static headline
//!
//! ## Example: news with fallbacks
//!
//! ```rust,no_run
//! use dapplink_mcp::{NewsOrchestrator, SessionConfig, SessionManager};
//! use dapplink_tools::{NewsFeed, NewsFeedConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SessionManager::from_config(&SessionConfig::from_env()?);
//!     let feed = NewsFeed::new(NewsFeedConfig::from_env()?);
//!
//!     let orchestrator = NewsOrchestrator::standard(Arc::new(session), feed);
//!     let news = orchestrator.fetch_latest_news().await;
//!     println!("{}", news.news_text);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod orchestrator;
pub mod server;
pub mod session;

pub use error::{McpError, McpResult, ToolCallError};
pub use orchestrator::{DirectFeedStrategy, NewsOrchestrator, NewsStrategy, ToolProcessStrategy};
pub use server::{NewsToolServer, ServerIdentity, news_envelope};
pub use session::{
    ChildProcessConnector, SessionConfig, SessionManager, ToolClient, ToolConnector, ToolSession,
    WORKER_SUBCOMMAND, client_info, decode_news_items,
};
