//! # Model Oracle Adapters
//!
//! HTTP clients implementing [`TextOracle`] for an OpenAI-compatible chat
//! completions API and for a Text Generation Inference server.

use async_trait::async_trait;
use dapplink_core::{OracleError, TextOracle};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const MAX_NEW_TOKENS: u32 = 512;

/// Settings for an OpenAI-compatible backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Settings for a Text Generation Inference backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TgiConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl TgiConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Chat completions client that asks for a JSON object response.
#[derive(Debug, Clone)]
pub struct OpenAiOracle {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiOracle {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TextOracle for OpenAiOracle {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.0,
            "max_tokens": MAX_NEW_TOKENS,
            "response_format": { "type": "json_object" }
        });

        let request = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body);
        let reply: Value = send_json(request, self.config.timeout).await?;

        if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(OracleError::Api(message));
        }

        reply
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(OracleError::EmptyCompletion)
    }
}

/// Client for the TGI `/generate` endpoint.
#[derive(Debug, Clone)]
pub struct TgiOracle {
    client: Client,
    config: TgiConfig,
}

impl TgiOracle {
    pub fn new(config: TgiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TextOracle for TgiOracle {
    fn name(&self) -> &str {
        "tgi"
    }

    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!("{}/generate", self.config.url.trim_end_matches('/'));
        let body = json!({
            "inputs": prompt,
            "parameters": { "temperature": 0.0, "max_new_tokens": MAX_NEW_TOKENS }
        });

        let mut request = self.client.post(url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let reply: Value = send_json(request, self.config.timeout).await?;

        // TGI answers with an object, or an array of objects when batching.
        reply
            .get("generated_text")
            .or_else(|| reply.pointer("/0/generated_text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(OracleError::EmptyCompletion)
    }
}

async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, OracleError> {
    let response = request.timeout(timeout).send().await.map_err(|e| {
        if e.is_timeout() {
            OracleError::Timeout(timeout.as_secs())
        } else {
            OracleError::Request(e.to_string())
        }
    })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| OracleError::Request(e.to_string()))?;
    debug!(status = status.as_u16(), bytes = text.len(), "Oracle replied");

    // OpenAI reports API errors as JSON bodies on non-2xx statuses.
    match serde_json::from_str::<T>(&text) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !status.is_success() => Err(OracleError::Status {
            status: status.as_u16(),
            body: text,
        }),
        Err(e) => Err(OracleError::Request(format!("invalid JSON reply: {e}"))),
    }
}
