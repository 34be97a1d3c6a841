//! OpenAI chat completions client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{GenerateError, GeneratorConfig, PlanGenerator, ProviderKind, truncate_body};
use crate::prompt::Prompt;

/// Client for `POST {base}/chat/completions`.
#[derive(Debug)]
pub struct OpenAiClient {
    config: GeneratorConfig,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        let client = config.http_client()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// Request body: optional system message, then the user message.
pub(crate) fn request_body(model: &str, prompt: &Prompt) -> Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &prompt.system {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": prompt.user }));
    json!({ "model": model, "messages": messages })
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

pub(crate) fn parse_response(body: &str) -> Result<String, GenerateError> {
    let provider = ProviderKind::OpenAi;
    let parsed: ChatCompletion =
        serde_json::from_str(body).map_err(|e| GenerateError::Malformed {
            provider,
            detail: e.to_string(),
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerateError::Empty { provider })
}

#[async_trait]
impl PlanGenerator for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerateError> {
        let provider = ProviderKind::OpenAi;
        let api_key = self.config.require_api_key()?;

        debug!(model = %self.config.model, "calling openai chat completions");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request_body(&self.config.model, prompt))
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
