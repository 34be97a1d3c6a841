//! Gemini `generateContent` client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{GenerateError, GeneratorConfig, PlanGenerator, ProviderKind, truncate_body};
use crate::prompt::Prompt;

/// Client for `POST {base}/v1beta/models/{model}:generateContent`.
#[derive(Debug)]
pub struct GeminiClient {
    config: GeneratorConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        let client = config.http_client()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// Request body for `generateContent`.
pub(crate) fn request_body(prompt: &Prompt) -> Value {
    let mut body = json!({
        "contents": [
            { "role": "user", "parts": [{ "text": prompt.user }] }
        ]
    });
    if let Some(system) = &prompt.system {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    body
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Pull the text out of a successful `generateContent` body.
///
/// Text parts of the first candidate are concatenated in order.
pub(crate) fn parse_response(body: &str) -> Result<String, GenerateError> {
    let provider = ProviderKind::Gemini;
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GenerateError::Malformed {
            provider,
            detail: e.to_string(),
        })?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenerateError::Malformed {
                provider,
                detail: format!("prompt blocked: {reason}"),
            });
        }
        return Err(GenerateError::Empty { provider });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerateError::Empty { provider });
    }
    Ok(text)
}

#[async_trait]
impl PlanGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerateError> {
        let provider = ProviderKind::Gemini;
        let api_key = self.config.require_api_key()?;

        debug!(model = %self.config.model, "calling gemini generateContent");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|source| GenerateError::Transport { provider, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| GenerateError::Transport { provider, source })?;

        if !status.is_success() {
            return Err(GenerateError::Status {
                provider,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        parse_response(&body)
    }
}
