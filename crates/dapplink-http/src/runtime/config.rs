//! # Environment-Based Configuration
//!
//! ## Environment Variables
//!
//! ### HTTP
//! - `HOST` - bind address (default: 0.0.0.0)
//! - `PORT` - listen port (default: 8000)
//! - `DAPPLINK_STATIC_DIR` - web client directory (default: public)
//! - `DAPPLINK_ENABLE_CORS` - permissive CORS (default: true)
//!
//! ### Model
//! - `TGI_URL` - Text Generation Inference server; preferred when set
//! - `TGI_API_KEY` - optional bearer token for TGI
//! - `OPENAI_API_KEY` - OpenAI key, used when `TGI_URL` is unset
//! - `MODEL` - OpenAI model (default: gpt-4o-mini)
//! - `OPENAI_BASE_URL` - OpenAI-compatible base URL (default: https://api.openai.com)
//! - `DAPPLINK_ORACLE_TIMEOUT_SECS` - model request timeout (default: 60)
//!
//! ### News
//! - `DAPPLINK_NEWS_FEED_*` - see [`NewsFeedConfig::from_env`]
//! - `DAPPLINK_MCP_*` - see [`SessionConfig::from_env`]

use dapplink_core::TextOracle;
use dapplink_core::config::{
    ConfigError, get_env_bool, get_env_secs, get_env_string, get_env_u16, validate_timeout,
};
use dapplink_mcp::SessionConfig;
use dapplink_tools::{NewsFeedConfig, OpenAiConfig, OpenAiOracle, TgiConfig, TgiOracle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Which model backend answers chat prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleConfig {
    Tgi(TgiConfig),
    OpenAi(OpenAiConfig),
}

impl OracleConfig {
    pub fn backend(&self) -> &'static str {
        match self {
            OracleConfig::Tgi(_) => "tgi",
            OracleConfig::OpenAi(_) => "openai",
        }
    }

    pub fn build(&self) -> Arc<dyn TextOracle> {
        match self {
            OracleConfig::Tgi(config) => Arc::new(TgiOracle::new(config.clone())),
            OracleConfig::OpenAi(config) => Arc::new(OpenAiOracle::new(config.clone())),
        }
    }
}

/// Router options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub enable_cors: bool,
    /// Served as the fallback route when the directory exists
    pub static_dir: Option<PathBuf>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            static_dir: None,
        }
    }
}

/// Validated configuration of the chat server
#[derive(Debug, Clone)]
pub struct ChatRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub enable_cors: bool,
    pub oracle: OracleConfig,
    pub news_feed: NewsFeedConfig,
    pub session: SessionConfig,
}

impl ChatRuntimeConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            enable_cors: self.enable_cors,
            static_dir: Some(self.static_dir.clone()),
        }
    }
}

/// Builder for [`ChatRuntimeConfig`] with environment variable support
#[derive(Debug, Clone)]
pub struct ChatRuntimeConfigBuilder {
    host: String,
    port: u16,
    static_dir: PathBuf,
    enable_cors: bool,
    tgi_url: Option<String>,
    tgi_api_key: Option<String>,
    openai_api_key: Option<String>,
    model: String,
    openai_base_url: String,
    oracle_timeout: Duration,
    news_feed: NewsFeedConfig,
    session: SessionConfig,
}

impl Default for ChatRuntimeConfigBuilder {
    fn default() -> Self {
        let openai = OpenAiConfig::new("");
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("public"),
            enable_cors: true,
            tgi_url: None,
            tgi_api_key: None,
            openai_api_key: None,
            model: openai.model,
            openai_base_url: openai.base_url,
            oracle_timeout: openai.timeout,
            news_feed: NewsFeedConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ChatRuntimeConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        if let Some(host) = get_env_string("HOST") {
            builder = builder.host(host);
        }
        if let Some(port) = get_env_u16("PORT")? {
            builder = builder.port(port);
        }
        if let Some(dir) = get_env_string("DAPPLINK_STATIC_DIR") {
            builder = builder.static_dir(PathBuf::from(dir));
        }
        if let Some(cors) = get_env_bool("DAPPLINK_ENABLE_CORS")? {
            builder = builder.enable_cors(cors);
        }

        builder.tgi_url = get_env_string("TGI_URL");
        builder.tgi_api_key = get_env_string("TGI_API_KEY");
        builder.openai_api_key = get_env_string("OPENAI_API_KEY");
        if let Some(model) = get_env_string("MODEL") {
            builder = builder.model(model);
        }
        if let Some(url) = get_env_string("OPENAI_BASE_URL") {
            builder.openai_base_url = url;
        }
        if let Some(timeout) = get_env_secs("DAPPLINK_ORACLE_TIMEOUT_SECS")? {
            builder = builder.oracle_timeout(timeout);
        }

        builder.news_feed = NewsFeedConfig::from_env()?;
        builder.session = SessionConfig::from_env()?;

        Ok(builder)
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn static_dir(mut self, dir: PathBuf) -> Self {
        self.static_dir = dir;
        self
    }

    #[must_use]
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Use a TGI server, with an optional bearer key
    #[must_use]
    pub fn tgi(mut self, url: impl Into<String>, api_key: Option<String>) -> Self {
        self.tgi_url = Some(url.into());
        self.tgi_api_key = api_key;
        self
    }

    #[must_use]
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn news_feed(mut self, news_feed: NewsFeedConfig) -> Self {
        self.news_feed = news_feed;
        self
    }

    #[must_use]
    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Validate configuration and build [`ChatRuntimeConfig`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredentials` when neither a TGI URL nor an
    /// OpenAI key is set, and `ConfigError::ValidationError` for bad values.
    pub fn build(self) -> Result<ChatRuntimeConfig, ConfigError> {
        self.validate()?;

        let oracle = match (self.tgi_url, self.openai_api_key) {
            (Some(url), _) => OracleConfig::Tgi(TgiConfig {
                url,
                api_key: self.tgi_api_key,
                timeout: self.oracle_timeout,
            }),
            (None, Some(api_key)) => OracleConfig::OpenAi(OpenAiConfig {
                api_key,
                model: self.model,
                base_url: self.openai_base_url,
                timeout: self.oracle_timeout,
            }),
            (None, None) => return Err(ConfigError::MissingCredentials),
        };

        Ok(ChatRuntimeConfig {
            host: self.host,
            port: self.port,
            static_dir: self.static_dir,
            enable_cors: self.enable_cors,
            oracle,
            news_feed: self.news_feed,
            session: self.session,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidationError(
                "port must be greater than 0".to_string(),
            ));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "host cannot be empty".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model cannot be empty".to_string(),
            ));
        }
        validate_timeout("oracle_timeout", self.oracle_timeout)?;
        validate_timeout("news feed timeout", self.news_feed.timeout)?;
        self.session.validate()
    }
}
