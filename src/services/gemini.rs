// src/services/gemini.rs
use crate::common::config::AiConfig;
use crate::services::completion::{CompletionClient, CompletionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u32,
}

/// Google Generative Language (`generateContent`) client
#[derive(Debug)]
pub struct GeminiService {
    config: AiConfig,
    client: Client,
}

impl GeminiService {
    pub fn new(config: AiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Make API request with retry logic
    async fn make_request_with_retry(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CompletionError> {
        let max_retries = 2;
        let mut last_error = None;

        for attempt in 1..=max_retries {
            match self.make_request(api_key, request).await {
                Ok(response) => return Ok(response),
                Err(e @ CompletionError::InvalidResponse(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        error = %e,
                        "Gemini API request failed, retrying..."
                    );
                    last_error = Some(e);

                    if attempt < max_retries {
                        let delay = std::time::Duration::from_millis(500 * 2_u64.pow(attempt - 1));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CompletionError::RequestFailed("Unknown error".to_string())))
    }

    /// Make a single API request
    async fn make_request(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CompletionError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(self.config.timeout)
                } else {
                    CompletionError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Gemini API request failed");
            return Err(CompletionError::RequestFailed(format!("HTTP {}", status)));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))
    }
}

/// Joins the text parts of the first candidate
fn extract_text(response: &GenerateContentResponse) -> Result<String, CompletionError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(CompletionError::InvalidResponse(format!(
            "prompt blocked: {}",
            reason
        )));
    }

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| CompletionError::InvalidResponse("No candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(CompletionError::InvalidResponse(format!(
            "No text in candidate (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[async_trait]
impl CompletionClient for GeminiService {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(CompletionError::NotConfigured)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "Sending Gemini generateContent request"
        );

        let response = self.make_request_with_retry(api_key, &request).await?;
        let text = extract_text(&response)?;

        if let Some(usage) = &response.usage_metadata {
            info!(
                model = %self.config.model,
                tokens_used = usage.total_token_count,
                "Gemini text generation completed"
            );
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
