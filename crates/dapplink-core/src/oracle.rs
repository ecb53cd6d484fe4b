//! The language model seam.
//!
//! The chat runtime never inspects how text is produced; it only hands a
//! prompt to a [`TextOracle`] and validates what comes back.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while asking a model for text.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Request(String),

    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle API error: {0}")]
    Api(String),

    #[error("oracle returned no completion text")]
    EmptyCompletion,

    #[error("oracle timed out after {0} seconds")]
    Timeout(u64),
}

/// A text-generation backend.
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Generate raw text for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}
