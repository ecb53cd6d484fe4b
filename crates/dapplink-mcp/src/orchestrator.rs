//! News fetch orchestrator
//!
//! Tries an ordered list of strategies, each once, and returns the first
//! headline produced. When every strategy comes back empty the constant
//! [`NewsResponse::fallback`] is returned, so fetching news never fails.

use crate::session::ToolSession;
use async_trait::async_trait;
use dapplink_core::{NewsFilter, NewsResponse};
use dapplink_tools::{FetchNewsArgs, NewsFeed};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One tier of the fallback chain
#[async_trait]
pub trait NewsStrategy: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Produce a headline, or `None` to let the next tier try
    async fn attempt(&self) -> Option<NewsResponse>;
}

/// Ask the worker process through the tool session
pub struct ToolProcessStrategy {
    session: Arc<dyn ToolSession>,
    args: FetchNewsArgs,
}

impl ToolProcessStrategy {
    pub fn new(session: Arc<dyn ToolSession>) -> Self {
        Self {
            session,
            args: FetchNewsArgs::new(NewsFilter::Rising, 1),
        }
    }
}

#[async_trait]
impl NewsStrategy for ToolProcessStrategy {
    fn name(&self) -> &'static str {
        "tool_process"
    }

    async fn attempt(&self) -> Option<NewsResponse> {
        match self.session.fetch_news(&self.args).await {
            Ok(items) => match items.first() {
                Some(item) => Some(NewsResponse::from_item(item)),
                None => {
                    warn!(strategy = self.name(), "Tool returned no news items");
                    None
                }
            },
            Err(e) => {
                warn!(strategy = self.name(), kind = e.kind(), error = %e, "Tool call failed");
                None
            }
        }
    }
}

/// Query the news feed directly from this process
pub struct DirectFeedStrategy {
    feed: NewsFeed,
    filter: NewsFilter,
}

impl DirectFeedStrategy {
    pub fn new(feed: NewsFeed) -> Self {
        Self {
            feed,
            filter: NewsFilter::Rising,
        }
    }
}

#[async_trait]
impl NewsStrategy for DirectFeedStrategy {
    fn name(&self) -> &'static str {
        "direct_feed"
    }

    async fn attempt(&self) -> Option<NewsResponse> {
        match self.feed.fetch_posts(self.filter).await {
            Ok(posts) => match posts.first() {
                Some(post) => Some(NewsResponse::from_item(&post.to_news_item())),
                None => {
                    warn!(strategy = self.name(), "Feed returned no posts");
                    None
                }
            },
            Err(e) => {
                warn!(strategy = self.name(), error = %e, "Direct feed request failed");
                None
            }
        }
    }
}

/// Runs the fallback chain
pub struct NewsOrchestrator {
    strategies: Vec<Box<dyn NewsStrategy>>,
}

impl NewsOrchestrator {
    pub fn new(strategies: Vec<Box<dyn NewsStrategy>>) -> Self {
        Self { strategies }
    }

    /// Tool process first, then the direct feed
    pub fn standard(session: Arc<dyn ToolSession>, feed: NewsFeed) -> Self {
        Self::new(vec![
            Box::new(ToolProcessStrategy::new(session)),
            Box::new(DirectFeedStrategy::new(feed)),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn fetch_latest_news(&self) -> NewsResponse {
        for strategy in &self.strategies {
            let started = Instant::now();
            if let Some(news) = strategy.attempt().await {
                info!(
                    strategy = strategy.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    has_source = news.attributable_url().is_some(),
                    "Fetched latest news"
                );
                return news;
            }
            debug!(strategy = strategy.name(), "Strategy produced no news");
        }

        warn!("All news sources failed, using static headline");
        NewsResponse::fallback()
    }
}
