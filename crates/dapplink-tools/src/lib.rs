//! # DappLink Tools
//!
//! Adapters for everything the chat agent reaches over HTTP:
//!
//! - **News feed** ([`feed`]): CryptoPanic posts client shared by the worker
//!   process and the direct fallback tier
//! - **News tool** ([`crypto_news`]): the `fetch_crypto_news` capability with
//!   argument clamping and a synthetic fallback headline
//! - **Model oracles** ([`oracle`]): OpenAI and TGI text generation clients

pub mod crypto_news;
pub mod feed;
pub mod oracle;

pub use crypto_news::{FALLBACK_SOURCE, FetchCryptoNewsTool, FetchNewsArgs, MAX_LIMIT, fallback_item};
pub use feed::{DEFAULT_SOURCE_LABEL, FeedError, FeedPost, NewsFeed, NewsFeedConfig};
pub use oracle::{OpenAiConfig, OpenAiOracle, TgiConfig, TgiOracle};
