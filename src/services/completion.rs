// src/services/completion.rs
//! Single-turn text completion collaborator.
//!
//! Chat replies and title generation both go through [`CompletionClient::complete`];
//! they differ only in the prompt they send.

use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` as a single user turn and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Human-readable name used in logs
    fn name(&self) -> &str;
}

/// Runs `client.complete(prompt)` under a hard deadline.
///
/// A slow upstream yields `CompletionError::Timeout` instead of holding the
/// request open.
pub async fn complete_with_timeout(
    client: &dyn CompletionClient,
    prompt: &str,
    timeout: Duration,
) -> Result<String, CompletionError> {
    match tokio::time::timeout(timeout, client.complete(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(CompletionError::Timeout(timeout)),
    }
}
