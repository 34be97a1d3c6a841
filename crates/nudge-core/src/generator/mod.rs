//! Text-generation clients.
//!
//! [`PlanGenerator`] is the seam the handler talks to; [`GeminiClient`] and
//! [`OpenAiClient`] are the two HTTP implementations. [`build_generator`]
//! picks one from a resolved [`GeneratorConfig`].

pub mod gemini;
pub mod openai;
pub mod trait_def;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::prompt::PromptStyle;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use trait_def::PlanGenerator;

/// Default request timeout for generation calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest slice of an error response body kept in error messages.
const MAX_ERROR_BODY: usize = 500;

// ---------------------------------------------------------------------------
// Provider kind
// ---------------------------------------------------------------------------

/// Which generation API to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    /// Model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    /// API root used when no base URL is configured.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Chat APIs get a system instruction; Gemini gets a single prompt.
    pub fn default_prompt_style(self) -> PromptStyle {
        match self {
            Self::Gemini => PromptStyle::Plain,
            Self::OpenAi => PromptStyle::WithSystemRole,
        }
    }

    /// Environment variable conventionally holding this provider's key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        };
        f.write_str(s)
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(ProviderKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProviderKind`] string.
#[derive(Debug, Clone, Error)]
#[error("invalid provider: {0:?} (expected gemini or openai)")]
pub struct ProviderKindParseError(pub String);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from a single generation call.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: ProviderKind },

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("unexpected {provider} response: {detail}")]
    Malformed {
        provider: ProviderKind,
        detail: String,
    },

    #[error("{provider} returned no text")]
    Empty { provider: ProviderKind },
}

/// Cap an error body so one bad response does not flood the page or the log.
pub(crate) fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Fully resolved settings for one generation client.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// `None` still builds a client; every call then fails with
    /// [`GenerateError::MissingApiKey`].
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    /// Provider defaults with no API key.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            base_url: provider.default_base_url().to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured key, or [`GenerateError::MissingApiKey`] if it is
    /// absent or blank.
    pub(crate) fn require_api_key(&self) -> Result<&str, GenerateError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerateError::MissingApiKey {
                provider: self.provider,
            })
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, GenerateError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|source| GenerateError::Transport {
                provider: self.provider,
                source,
            })
    }
}

/// Build the client for `config.provider`.
pub fn build_generator(config: GeneratorConfig) -> Result<Box<dyn PlanGenerator>, GenerateError> {
    let generator: Box<dyn PlanGenerator> = match config.provider {
        ProviderKind::Gemini => Box::new(GeminiClient::new(config)?),
        ProviderKind::OpenAi => Box::new(OpenAiClient::new(config)?),
    };
    Ok(generator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_and_displays() {
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
        let err = "claude".parse::<ProviderKind>().unwrap_err();
        assert!(err.to_string().contains("claude"));
    }

    #[test]
    fn provider_defaults_pair_style_with_api_shape() {
        assert_eq!(ProviderKind::Gemini.default_prompt_style(), PromptStyle::Plain);
        assert_eq!(
            ProviderKind::OpenAi.default_prompt_style(),
            PromptStyle::WithSystemRole
        );
        assert_eq!(ProviderKind::Gemini.api_key_env(), "GEMINI_API_KEY");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = GeneratorConfig::new(ProviderKind::Gemini).with_api_key("   ");
        assert!(matches!(
            cfg.require_api_key(),
            Err(GenerateError::MissingApiKey {
                provider: ProviderKind::Gemini
            })
        ));

        let cfg = GeneratorConfig::new(ProviderKind::OpenAi).with_api_key("sk-test");
        assert_eq!(cfg.require_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn truncate_body_caps_long_bodies() {
        let long = "가".repeat(MAX_ERROR_BODY + 10);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY + 3);

        assert_eq!(truncate_body("  short \n"), "short");
    }

    #[test]
    fn build_generator_picks_provider() {
        let g = build_generator(GeneratorConfig::new(ProviderKind::Gemini)).unwrap();
        assert_eq!(g.name(), "gemini");
        let g = build_generator(GeneratorConfig::new(ProviderKind::OpenAi)).unwrap();
        assert_eq!(g.name(), "openai");
    }

    #[test]
    fn missing_key_error_names_provider() {
        let err = GenerateError::MissingApiKey {
            provider: ProviderKind::OpenAi,
        };
        assert_eq!(err.to_string(), "openai API key is not configured");
    }
}
