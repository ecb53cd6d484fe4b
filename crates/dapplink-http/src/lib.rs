//! # DappLink HTTP Runtime
//!
//! Axum server for the DappLink assistant:
//!
//! - **Chat** (`POST /chat`): optional news injection, prompt, model call and
//!   output validation, always answered with a 200
//! - **Health** (`GET /health`): liveness probe
//! - **Static files**: the web client, served from a configurable directory

pub mod runtime;

// Re-export main types for public API
pub use runtime::*;
