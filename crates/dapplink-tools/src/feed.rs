//! # Crypto News Feed Client
//!
//! Thin client for the CryptoPanic posts API. Both the tool worker and the
//! direct-HTTP fallback tier read headlines through [`NewsFeed`].

use dapplink_core::config::{self, ConfigError};
use dapplink_core::{NewsFilter, NewsItem};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Label used when a post carries neither a domain nor a source title.
pub const DEFAULT_SOURCE_LABEL: &str = "crypto news";

const POSTS_PATH: &str = "/api/v1/posts/";

/// Errors raised while talking to the news feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("news feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("news feed returned HTTP {0}")]
    Status(u16),

    #[error("news feed payload is malformed: {0}")]
    Malformed(String),
}

/// Connection settings for the news feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFeedConfig {
    pub base_url: String,
    pub auth_token: String,
    pub timeout: Duration,
}

impl Default for NewsFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cryptopanic.com".to_string(),
            auth_token: "free".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl NewsFeedConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load feed settings from the environment.
    ///
    /// - `DAPPLINK_NEWS_FEED_URL` - base URL (default: https://cryptopanic.com)
    /// - `DAPPLINK_NEWS_FEED_TOKEN` - API token (default: free)
    /// - `DAPPLINK_NEWS_FEED_TIMEOUT_SECS` - request timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut feed = Self::default();
        if let Some(url) = config::get_env_string("DAPPLINK_NEWS_FEED_URL") {
            feed.base_url = url;
        }
        if let Some(token) = config::get_env_string("DAPPLINK_NEWS_FEED_TOKEN") {
            feed.auth_token = token;
        }
        if let Some(timeout) = config::get_env_secs("DAPPLINK_NEWS_FEED_TIMEOUT_SECS")? {
            feed.timeout = timeout;
        }
        config::validate_timeout("news feed timeout", feed.timeout)?;
        Ok(feed)
    }

    fn posts_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), POSTS_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct FeedPage {
    #[serde(default)]
    results: Option<Vec<FeedPost>>,
}

/// One post as returned by the feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPost {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub source: Option<FeedSource>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSource {
    #[serde(default)]
    pub title: Option<String>,
}

impl FeedPost {
    /// Source attribution: domain, then source title, then a constant label.
    pub fn source_label(&self) -> &str {
        non_empty(self.domain.as_deref())
            .or_else(|| non_empty(self.source.as_ref().and_then(|s| s.title.as_deref())))
            .unwrap_or(DEFAULT_SOURCE_LABEL)
    }

    pub fn to_news_item(&self) -> NewsItem {
        NewsItem::new(
            self.title.clone(),
            self.source_label(),
            self.url.clone().unwrap_or_default(),
            self.published_at.clone().unwrap_or_default(),
        )
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// HTTP client for the posts endpoint.
#[derive(Debug, Clone)]
pub struct NewsFeed {
    client: Client,
    config: NewsFeedConfig,
}

impl NewsFeed {
    pub fn new(config: NewsFeedConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: NewsFeedConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &NewsFeedConfig {
        &self.config
    }

    /// Fetch the current page of news posts for `filter`.
    ///
    /// A page without a `results` array is reported as an empty list.
    pub async fn fetch_posts(&self, filter: NewsFilter) -> Result<Vec<FeedPost>, FeedError> {
        let response = self
            .client
            .get(self.config.posts_url())
            .query(&[
                ("auth_token", self.config.auth_token.as_str()),
                ("public", "true"),
                ("kind", "news"),
                ("filter", filter.as_str()),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let page: FeedPage =
            serde_json::from_str(&body).map_err(|e| FeedError::Malformed(e.to_string()))?;
        let posts = page.results.unwrap_or_default();

        debug!(filter = %filter, posts = posts.len(), "Fetched news feed page");
        Ok(posts)
    }
}
