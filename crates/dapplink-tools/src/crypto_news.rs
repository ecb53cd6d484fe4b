//! # Crypto News Tool
//!
//! The single capability served by the news worker process. Given a filter and
//! a limit it returns headlines from the feed, and when the feed has nothing
//! usable it returns one synthetic item instead of failing.

use crate::feed::NewsFeed;
use chrono::{SecondsFormat, Utc};
use dapplink_core::{FETCH_CRYPTO_NEWS, NewsFilter, NewsItem};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

/// Largest number of items one call may return.
pub const MAX_LIMIT: u64 = 20;

/// Source label carried by the synthetic item.
pub const FALLBACK_SOURCE: &str = "fallback";

const FALLBACK_HEADLINE: &str = "Latest crypto news: DeFi protocols seeing increased adoption and institutional interest continues to grow.";

const DESCRIPTION: &str = "Fetches the latest trending cryptocurrency news from CryptoPanic API. Returns news title, source, and URL.";

/// Normalized arguments of a `fetch_crypto_news` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchNewsArgs {
    pub filter: NewsFilter,
    pub limit: u64,
}

impl Default for FetchNewsArgs {
    fn default() -> Self {
        Self {
            filter: NewsFilter::Rising,
            limit: 1,
        }
    }
}

impl FetchNewsArgs {
    pub fn new(filter: NewsFilter, limit: u64) -> Self {
        Self {
            filter,
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Read arguments leniently from a tool call.
    ///
    /// A missing or unknown filter falls back to `rising`; the limit accepts
    /// numbers or numeric strings and is clamped to `1..=20`.
    pub fn from_arguments(arguments: Option<&Map<String, Value>>) -> Self {
        let Some(arguments) = arguments else {
            return Self::default();
        };

        let filter = match arguments.get("filter").and_then(Value::as_str) {
            Some(raw) => raw.parse().unwrap_or_else(|err: String| {
                warn!(error = %err, "Ignoring unknown filter, using rising");
                NewsFilter::Rising
            }),
            None => NewsFilter::Rising,
        };

        let limit = arguments.get("limit").and_then(parse_limit).unwrap_or(1);

        Self::new(filter, limit)
    }

    /// Serialize back into tool-call arguments.
    pub fn to_arguments(&self) -> Map<String, Value> {
        let mut arguments = Map::new();
        arguments.insert("filter".to_string(), json!(self.filter.as_str()));
        arguments.insert("limit".to_string(), json!(self.limit));
        arguments
    }
}

fn parse_limit(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() || number < 1.0 {
        return None;
    }
    Some(number.min(MAX_LIMIT as f64) as u64)
}

/// The synthetic item returned when the feed yields nothing usable.
pub fn fallback_item() -> NewsItem {
    NewsItem::new(
        FALLBACK_HEADLINE,
        FALLBACK_SOURCE,
        "",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

/// `fetch_crypto_news` backed by a [`NewsFeed`].
#[derive(Debug, Clone)]
pub struct FetchCryptoNewsTool {
    feed: NewsFeed,
}

impl FetchCryptoNewsTool {
    pub fn new(feed: NewsFeed) -> Self {
        Self { feed }
    }

    pub fn name(&self) -> &'static str {
        FETCH_CRYPTO_NEWS
    }

    pub fn description(&self) -> &'static str {
        DESCRIPTION
    }

    /// JSON schema of the tool arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let filters: Vec<&str> = NewsFilter::all().iter().map(NewsFilter::as_str).collect();
        let schema = json!({
            "type": "object",
            "properties": {
                "filter": {
                    "type": "string",
                    "description": "Filter type: 'rising', 'hot', or 'bullish'",
                    "enum": filters,
                    "default": NewsFilter::default().as_str()
                },
                "limit": {
                    "type": "number",
                    "description": "Number of news items to fetch (1-20)",
                    "minimum": 1,
                    "maximum": MAX_LIMIT,
                    "default": 1
                }
            }
        });
        match schema {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Fetch up to `args.limit` headlines; never returns an empty list.
    pub async fn run(&self, args: &FetchNewsArgs) -> Vec<NewsItem> {
        match self.feed.fetch_posts(args.filter).await {
            Ok(posts) if !posts.is_empty() => {
                let items: Vec<NewsItem> = posts
                    .iter()
                    .take(args.limit as usize)
                    .map(|post| post.to_news_item())
                    .collect();
                debug!(filter = %args.filter, items = items.len(), "Returning feed headlines");
                items
            }
            Ok(_) => {
                warn!(filter = %args.filter, "News feed returned no posts, using fallback item");
                vec![fallback_item()]
            }
            Err(err) => {
                warn!(filter = %args.filter, error = %err, "News feed unavailable, using fallback item");
                vec![fallback_item()]
            }
        }
    }
}
