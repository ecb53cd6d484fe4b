//! News data carried between the tool provider, the orchestrator and the prompt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the single tool exposed by the news worker process.
pub const FETCH_CRYPTO_NEWS: &str = "fetch_crypto_news";

/// Headline returned when every news source is unavailable.
const STATIC_HEADLINE: &str = "Web3 ecosystem continues expansion with new Layer2 solutions and cross-chain protocols gaining traction across multiple blockchains.";

/// A single headline as produced by the tool provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub published_at: String,
}

impl NewsItem {
    pub fn new(
        title: impl Into<String>,
        source: impl Into<String>,
        url: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            url: url.into(),
            published_at: published_at.into(),
        }
    }
}

/// News text injected into the prompt plus the URL it can be attributed to.
///
/// An empty `source_url` means the text has no attributable origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsResponse {
    pub news_text: String,
    pub source_url: String,
}

impl NewsResponse {
    /// Build the response from a headline: title, newline, then `source: <label>`.
    pub fn from_item(item: &NewsItem) -> Self {
        Self {
            news_text: format!("{}\nsource: {}", item.title, item.source),
            source_url: item.url.clone(),
        }
    }

    /// The constant returned when no tier of the fallback chain produced news.
    pub fn fallback() -> Self {
        Self {
            news_text: STATIC_HEADLINE.to_string(),
            source_url: String::new(),
        }
    }

    /// The source URL, if there is one worth reporting.
    pub fn attributable_url(&self) -> Option<&str> {
        if self.source_url.is_empty() {
            None
        } else {
            Some(&self.source_url)
        }
    }
}

/// Feed ranking filter accepted by the news tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsFilter {
    #[default]
    Rising,
    Hot,
    Bullish,
}

impl NewsFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsFilter::Rising => "rising",
            NewsFilter::Hot => "hot",
            NewsFilter::Bullish => "bullish",
        }
    }

    pub fn all() -> &'static [NewsFilter] {
        &[NewsFilter::Rising, NewsFilter::Hot, NewsFilter::Bullish]
    }
}

impl fmt::Display for NewsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rising" => Ok(NewsFilter::Rising),
            "hot" => Ok(NewsFilter::Hot),
            "bullish" => Ok(NewsFilter::Bullish),
            other => Err(format!("unknown news filter '{other}'")),
        }
    }
}
