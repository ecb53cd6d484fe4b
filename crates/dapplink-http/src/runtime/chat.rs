//! Chat pipeline shared by the HTTP handlers

use crate::runtime::config::ChatRuntimeConfig;
use dapplink_core::{ChatResult, TextOracle, build_prompt, is_news_request, validate_output};
use dapplink_mcp::{NewsOrchestrator, SessionManager};
use dapplink_tools::NewsFeed;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Body of `POST /chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub input: String,
    /// Accepted for client compatibility; no document store is wired in.
    #[serde(rename = "useRag", default)]
    pub use_rag: bool,
}

impl ChatRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            use_rag: false,
        }
    }
}

/// Everything a chat request needs, cheap to clone into handlers
#[derive(Clone)]
pub struct ChatRuntime {
    news: Arc<NewsOrchestrator>,
    oracle: Arc<dyn TextOracle>,
}

impl ChatRuntime {
    pub fn new(news: Arc<NewsOrchestrator>, oracle: Arc<dyn TextOracle>) -> Self {
        Self { news, oracle }
    }

    /// Wire the tool session, direct feed and model oracle from configuration.
    ///
    /// The worker process is not started here; the first news request does it.
    pub fn from_config(config: &ChatRuntimeConfig) -> Self {
        let session = SessionManager::from_config(&config.session);
        let feed = NewsFeed::new(config.news_feed.clone());
        let news = NewsOrchestrator::standard(Arc::new(session), feed);

        info!(
            oracle = config.oracle.backend(),
            worker = %config.session.command,
            strategies = ?news.strategy_names(),
            "Chat runtime configured"
        );

        Self::new(Arc::new(news), config.oracle.build())
    }

    /// Answer one chat message.
    ///
    /// Never fails: oracle errors and contract violations are logged and
    /// answered with [`ChatResult::unavailable`].
    pub async fn answer(&self, request: &ChatRequest) -> ChatResult {
        let mut input = request.input.clone();
        let mut news_source = None;

        if is_news_request(&input) {
            let news = self.news.fetch_latest_news().await;
            news_source = news.attributable_url().map(str::to_string);
            input = news.news_text;
        }
        if request.use_rag {
            debug!("Retrieval requested but no document store is configured");
        }

        let prompt = build_prompt(&input, &[]);
        let raw = match self.oracle.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(oracle = self.oracle.name(), error = %e, "Model request failed");
                return ChatResult::unavailable();
            }
        };

        match validate_output(&raw, news_source.as_deref()) {
            Ok(result) => result,
            Err(e) => {
                error!(
                    oracle = self.oracle.name(),
                    error = %e,
                    raw_len = raw.len(),
                    "Model output violated the response contract"
                );
                ChatResult::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dapplink_core::{NewsResponse, OracleError};
    use dapplink_mcp::NewsStrategy;
    use std::sync::Mutex;

    /// Records prompts and replies with a fixed result
    struct ScriptedOracle {
        reply: Result<String, OracleError>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedOracle {
        fn new(reply: Result<String, OracleError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl TextOracle for ScriptedOracle {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(OracleError::EmptyCompletion),
            }
        }
    }

    struct FixedNews(NewsResponse);

    #[async_trait]
    impl NewsStrategy for FixedNews {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn attempt(&self) -> Option<NewsResponse> {
            Some(self.0.clone())
        }
    }

    fn runtime(news: NewsResponse, oracle: Arc<ScriptedOracle>) -> ChatRuntime {
        let orchestrator = NewsOrchestrator::new(vec![Box::new(FixedNews(news))]);
        ChatRuntime::new(Arc::new(orchestrator), oracle)
    }

    #[test]
    fn test_request_deserialises_use_rag() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"input":"hi","useRag":true}"#).unwrap();
        assert!(request.use_rag);
        let request: ChatRequest = serde_json::from_str(r#"{"input":"hi"}"#).unwrap();
        assert!(!request.use_rag);
    }

    #[tokio::test]
    async fn test_news_replaces_input_and_source() {
        let oracle = ScriptedOracle::new(Ok(r#"{"answer":"BTC is up","source":null}"#.into()));
        let news = NewsResponse {
            news_text: "BTC rallies\nsource: coindesk.com".to_string(),
            source_url: "http://x".to_string(),
        };
        let runtime = runtime(news, oracle.clone());

        let result = runtime.answer(&ChatRequest::new("Latest news please")).await;
        assert_eq!(result, ChatResult::new("BTC is up", Some("http://x".into())));
        assert!(
            oracle
                .last_prompt()
                .ends_with("User: BTC rallies\nsource: coindesk.com\nAssistant:")
        );
    }

    #[tokio::test]
    async fn test_static_news_keeps_model_source() {
        let oracle =
            ScriptedOracle::new(Ok(r#"{"answer":"Layer2 grows","source":"model"}"#.into()));
        let runtime = runtime(NewsResponse::fallback(), oracle);

        let result = runtime.answer(&ChatRequest::new("latest news")).await;
        assert_eq!(result.source.as_deref(), Some("model"));
    }

    #[tokio::test]
    async fn test_oracle_failure_is_unavailable() {
        let oracle = ScriptedOracle::new(Err(OracleError::Timeout(60)));
        let runtime = runtime(NewsResponse::fallback(), oracle);

        let result = runtime.answer(&ChatRequest::new("hello")).await;
        assert_eq!(result, ChatResult::unavailable());
    }
}
