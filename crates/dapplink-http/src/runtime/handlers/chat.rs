use axum::{extract::State, response::Json};
use dapplink_core::ChatResult;
use std::time::Instant;
use tracing::info;

use crate::runtime::{ChatRequest, ChatRuntime};

/// POST /chat - answer a message, always with 200
pub async fn chat(
    State(runtime): State<ChatRuntime>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResult> {
    let started = Instant::now();
    let result = runtime.answer(&request).await;

    info!(
        input_len = request.input.len(),
        use_rag = request.use_rag,
        has_source = result.source.is_some(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Chat request answered"
    );
    Json(result)
}
