//! # DappLink Core
//!
//! Shared building blocks for the DappLink chat agent:
//!
//! - **News types**: [`NewsItem`], [`NewsResponse`] and the feed [`NewsFilter`]
//! - **Intent classification**: [`is_news_request`] decides when to inject news
//! - **Output contract**: [`validate_output`] turns raw model text into a [`ChatResult`]
//! - **Prompting**: [`build_prompt`] assembles the persona prompt
//! - **Oracle seam**: the [`TextOracle`] trait implemented by model adapters
//! - **Configuration helpers**: typed environment variable parsing

pub mod config;
pub mod contract;
pub mod intent;
pub mod news;
pub mod oracle;
pub mod prompt;

pub use config::ConfigError;
pub use contract::{ChatResult, ContractViolation, UNAVAILABLE_ANSWER, validate_output};
pub use intent::{NEWS_TRIGGERS, is_news_request};
pub use news::{FETCH_CRYPTO_NEWS, NewsFilter, NewsItem, NewsResponse};
pub use oracle::{OracleError, TextOracle};
pub use prompt::{SYSTEM_PROMPT, build_prompt};
