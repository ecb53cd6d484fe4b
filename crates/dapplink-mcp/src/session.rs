//! Client session to the news worker process
//!
//! The session is a process-wide slot that is either disconnected, in the
//! middle of one handshake, or holding a live client. The first caller starts
//! the worker; concurrent callers join that same attempt through a `watch`
//! channel instead of spawning their own. The handshake runs on its own task,
//! so a caller that gives up cannot leave the slot stuck in `Connecting`.

use crate::error::{McpError, McpResult, ToolCallError};
use async_trait::async_trait;
use dapplink_core::config::{ConfigError, get_env_secs, get_env_string, validate_timeout};
use dapplink_core::{FETCH_CRYPTO_NEWS, NewsItem};
use dapplink_tools::FetchNewsArgs;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ClientInfo, ErrorCode, Implementation, JsonObject,
    RawContent, Tool,
};
use rmcp::service::{RunningService, ServiceError};
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::{RoleClient, ServiceExt};
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// A connected MCP client
pub type ToolClient = RunningService<RoleClient, ClientInfo>;

/// Subcommand the default worker command is started with
pub const WORKER_SUBCOMMAND: &str = "mcp-server";

/// Opens a new connection to a tool server
#[async_trait]
pub trait ToolConnector: Send + Sync {
    async fn connect(&self) -> McpResult<ToolClient>;
}

/// Anything that can fetch news items through the tool process
#[async_trait]
pub trait ToolSession: Send + Sync {
    async fn fetch_news(&self, args: &FetchNewsArgs) -> Result<Vec<NewsItem>, ToolCallError>;
}

/// Identity this process reports when initializing a session
pub fn client_info() -> ClientInfo {
    ClientInfo {
        protocol_version: Default::default(),
        capabilities: Default::default(),
        client_info: Implementation {
            name: "dapplink-chat".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Worker executable
    pub command: String,
    /// Worker arguments
    pub args: Vec<String>,
    /// Upper bound on spawn plus initialize handshake
    pub handshake_timeout: Duration,
    /// Upper bound on a single tool call
    pub call_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let command = std::env::current_exe()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "dapplink".to_string());
        Self {
            command,
            args: vec![WORKER_SUBCOMMAND.to_string()],
            handshake_timeout: Duration::from_secs(10),
            call_timeout: Duration::from_secs(15),
        }
    }
}

impl SessionConfig {
    /// Load from `DAPPLINK_MCP_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(command) = get_env_string("DAPPLINK_MCP_COMMAND") {
            config.command = command;
            config.args = Vec::new();
        }
        if let Some(args) = get_env_string("DAPPLINK_MCP_ARGS") {
            config.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(timeout) = get_env_secs("DAPPLINK_MCP_HANDSHAKE_TIMEOUT_SECS")? {
            config.handshake_timeout = timeout;
        }
        if let Some(timeout) = get_env_secs("DAPPLINK_MCP_CALL_TIMEOUT_SECS")? {
            config.call_timeout = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tool server command cannot be empty".to_string(),
            ));
        }
        validate_timeout("handshake_timeout", self.handshake_timeout)?;
        validate_timeout("call_timeout", self.call_timeout)?;
        Ok(())
    }
}

/// Starts the worker as a child process and talks MCP over its stdio
#[derive(Debug, Clone)]
pub struct ChildProcessConnector {
    command: String,
    args: Vec<String>,
}

impl ChildProcessConnector {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

#[async_trait]
impl ToolConnector for ChildProcessConnector {
    async fn connect(&self) -> McpResult<ToolClient> {
        debug!(command = %self.command, args = ?self.args, "Spawning tool server");

        let command = Command::new(&self.command).configure(|cmd| {
            cmd.args(&self.args)
                .stderr(Stdio::inherit())
                .kill_on_drop(true);
        });
        let transport = TokioChildProcess::new(command).map_err(|e| McpError::Spawn {
            command: self.command.clone(),
            message: e.to_string(),
        })?;

        client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::ConnectionError(format!("initialize failed: {e}")))
    }
}

#[derive(Clone)]
enum Handshake {
    Pending,
    Done(Option<Arc<ToolClient>>),
}

enum SessionState {
    Disconnected,
    Connecting(watch::Receiver<Handshake>),
    Connected(Arc<ToolClient>),
}

struct SessionInner {
    connector: Arc<dyn ToolConnector>,
    state: Mutex<SessionState>,
    handshake_timeout: Duration,
    call_timeout: Duration,
}

impl SessionInner {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_handshake(self: Arc<Self>, tx: watch::Sender<Handshake>) {
        let started = Instant::now();
        let outcome = match timeout(self.handshake_timeout, self.connector.connect()).await {
            Ok(Ok(client)) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Connected to tool server"
                );
                Some(Arc::new(client))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Tool server handshake failed");
                None
            }
            Err(_) => {
                let e = McpError::HandshakeTimeout(self.handshake_timeout.as_secs());
                warn!(error = %e, "Tool server handshake failed");
                None
            }
        };

        *self.lock_state() = match &outcome {
            Some(client) => SessionState::Connected(Arc::clone(client)),
            None => SessionState::Disconnected,
        };
        // No receivers just means every waiter gave up.
        let _ = tx.send(Handshake::Done(outcome));
    }
}

/// Lazily connected, shared session to the news worker
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    pub fn new(
        connector: Arc<dyn ToolConnector>,
        handshake_timeout: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                connector,
                state: Mutex::new(SessionState::Disconnected),
                handshake_timeout,
                call_timeout,
            }),
        }
    }

    /// Session that spawns the configured worker command
    pub fn from_config(config: &SessionConfig) -> Self {
        let connector = ChildProcessConnector::new(config.command.clone(), config.args.clone());
        Self::new(
            Arc::new(connector),
            config.handshake_timeout,
            config.call_timeout,
        )
    }

    pub fn is_connected(&self) -> bool {
        matches!(*self.inner.lock_state(), SessionState::Connected(_))
    }

    /// Get the live client, connecting first if needed.
    ///
    /// Returns `None` when the worker cannot be started or the handshake fails
    /// or times out; the slot is then free for the next caller to retry.
    pub async fn acquire(&self) -> Option<Arc<ToolClient>> {
        let mut rx = {
            let mut state = self.inner.lock_state();
            let in_flight = match &*state {
                SessionState::Connected(client) => return Some(Arc::clone(client)),
                // A dropped sender means the handshake task died; start over.
                SessionState::Connecting(rx) if rx.has_changed().is_ok() => Some(rx.clone()),
                _ => None,
            };
            match in_flight {
                Some(rx) => rx,
                None => {
                    let (tx, rx) = watch::channel(Handshake::Pending);
                    *state = SessionState::Connecting(rx.clone());
                    tokio::spawn(Arc::clone(&self.inner).run_handshake(tx));
                    rx
                }
            }
        };

        let outcome = rx
            .wait_for(|h| !matches!(h, Handshake::Pending))
            .await
            .map(|h| (*h).clone());
        match outcome {
            Ok(Handshake::Done(client)) => client,
            _ => None,
        }
    }

    /// Drop the stored client if it is still the given one
    pub fn invalidate(&self, client: &Arc<ToolClient>) {
        let mut state = self.inner.lock_state();
        if let SessionState::Connected(current) = &*state
            && Arc::ptr_eq(current, client)
        {
            *state = SessionState::Disconnected;
            info!("Tool server session reset");
        }
    }

    /// Tools the worker declares
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let client = self
            .acquire()
            .await
            .ok_or_else(|| McpError::ConnectionError("tool server unavailable".to_string()))?;
        client.peer().list_all_tools().await.map_err(|e| {
            self.invalidate(&client);
            McpError::TransportError(e.to_string())
        })
    }

    /// Call a tool with a bounded wait
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolCallError> {
        let client = self.acquire().await.ok_or_else(|| {
            ToolCallError::Unreachable("could not connect to tool server".to_string())
        })?;

        let request = CallToolRequestParam {
            name: name.to_string().into(),
            arguments: Some(arguments),
        };

        match timeout(self.inner.call_timeout, client.peer().call_tool(request)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(ServiceError::McpError(error))) => {
                if error.code.0 == ErrorCode::INVALID_PARAMS.0 {
                    Err(ToolCallError::UnknownTool(error.message.to_string()))
                } else {
                    Err(ToolCallError::Malformed(error.message.to_string()))
                }
            }
            Ok(Err(e)) => {
                self.invalidate(&client);
                Err(ToolCallError::Unreachable(e.to_string()))
            }
            Err(_) => {
                self.invalidate(&client);
                Err(ToolCallError::Unreachable(format!(
                    "tool call timed out after {} seconds",
                    self.inner.call_timeout.as_secs()
                )))
            }
        }
    }
}

#[async_trait]
impl ToolSession for SessionManager {
    async fn fetch_news(&self, args: &FetchNewsArgs) -> Result<Vec<NewsItem>, ToolCallError> {
        let result = self.call_tool(FETCH_CRYPTO_NEWS, args.to_arguments()).await?;
        decode_news_items(&result)
    }
}

/// Read the news item list from the first text content of a tool result
pub fn decode_news_items(result: &CallToolResult) -> Result<Vec<NewsItem>, ToolCallError> {
    let text = result.content.iter().find_map(|content| match &content.raw {
        RawContent::Text(text) => Some(text.text.as_str()),
        _ => None,
    });

    if result.is_error == Some(true) {
        return Err(ToolCallError::Malformed(format!(
            "tool reported an error: {}",
            text.unwrap_or("no details")
        )));
    }

    let text =
        text.ok_or_else(|| ToolCallError::Malformed("result has no text content".to_string()))?;
    serde_json::from_str(text).map_err(|e| ToolCallError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;
    use serial_test::serial;

    #[test]
    fn test_default_config_runs_current_exe_worker() {
        let config = SessionConfig::default();
        assert_eq!(config.args, vec!["mcp-server".to_string()]);
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
        assert_eq!(config.call_timeout, Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_config_from_env_overrides() {
        unsafe {
            std::env::set_var("DAPPLINK_MCP_COMMAND", "/usr/local/bin/news-worker");
            std::env::set_var("DAPPLINK_MCP_ARGS", "--stdio  --quiet");
            std::env::set_var("DAPPLINK_MCP_CALL_TIMEOUT_SECS", "5");
        }

        let config = SessionConfig::from_env().unwrap();
        assert_eq!(config.command, "/usr/local/bin/news-worker");
        assert_eq!(config.args, vec!["--stdio", "--quiet"]);
        assert_eq!(config.call_timeout, Duration::from_secs(5));
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));

        unsafe {
            std::env::remove_var("DAPPLINK_MCP_COMMAND");
            std::env::remove_var("DAPPLINK_MCP_ARGS");
            std::env::remove_var("DAPPLINK_MCP_CALL_TIMEOUT_SECS");
        }
    }

    #[test]
    #[serial]
    fn test_config_rejects_zero_timeout() {
        unsafe {
            std::env::set_var("DAPPLINK_MCP_HANDSHAKE_TIMEOUT_SECS", "0");
        }
        assert!(SessionConfig::from_env().is_err());
        unsafe {
            std::env::remove_var("DAPPLINK_MCP_HANDSHAKE_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_decode_items() {
        let result = CallToolResult::success(vec![Content::text(
            r#"[{"title":"BTC rallies","source":"coindesk.com","url":"http://x","published_at":""}]"#,
        )]);
        let items = decode_news_items(&result).unwrap();
        assert_eq!(items[0].title, "BTC rallies");
        assert_eq!(items[0].url, "http://x");
    }

    #[test]
    fn test_decode_rejects_error_envelope_and_garbage() {
        let flagged = CallToolResult::error(vec![Content::text(
            r#"{"error":"Failed to fetch crypto news","message":"boom"}"#,
        )]);
        assert!(matches!(
            decode_news_items(&flagged),
            Err(ToolCallError::Malformed(msg)) if msg.contains("boom")
        ));

        let garbage = CallToolResult::success(vec![Content::text("not json")]);
        assert!(matches!(
            decode_news_items(&garbage),
            Err(ToolCallError::Malformed(_))
        ));

        let empty = CallToolResult::success(vec![]);
        assert!(matches!(
            decode_news_items(&empty),
            Err(ToolCallError::Malformed(_))
        ));
    }

    struct FailingConnector;

    #[async_trait]
    impl ToolConnector for FailingConnector {
        async fn connect(&self) -> McpResult<ToolClient> {
            Err(McpError::ConnectionError("refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_handshake_returns_none_and_resets() {
        let session = SessionManager::new(
            Arc::new(FailingConnector),
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        assert!(session.acquire().await.is_none());
        assert!(!session.is_connected());

        let err = session
            .fetch_news(&FetchNewsArgs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolCallError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_missing_worker_binary_is_unreachable() {
        let session = SessionManager::new(
            Arc::new(ChildProcessConnector::new(
                "dapplink-worker-that-does-not-exist",
                Vec::new(),
            )),
            Duration::from_secs(2),
            Duration::from_secs(2),
        );
        assert!(session.acquire().await.is_none());
    }
}
