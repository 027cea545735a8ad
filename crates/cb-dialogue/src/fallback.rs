//! Free-text responses for turns the rules don't answer.
//!
//! `StaticFallback` returns a canned line per kind. `OllamaFallback` asks a
//! local Ollama model (`/api/generate`) and degrades to the same canned line
//! on any failure, so callers always get a string back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the fallback text is for; selects the prompt and the canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Casual,
    Availability,
    Booking,
}

impl ResponseKind {
    /// Reply used when no generator is available.
    pub fn canned(&self) -> &'static str {
        match self {
            Self::Casual => "I'm here to help you with your calendar! What would you like to do?",
            Self::Availability => "I can check your availability. When would you like to check?",
            Self::Booking => "I can help you schedule that. What details do you need to add?",
        }
    }

    fn prompt(&self, text: &str) -> String {
        match self {
            Self::Casual => format!(
                "You are a helpful calendar assistant. Respond naturally and conversationally to: '{text}'. Keep it brief and friendly."
            ),
            Self::Availability => format!(
                "You are checking calendar availability. The user asked: '{text}'. Generate a brief, natural response asking for clarification if needed."
            ),
            Self::Booking => format!(
                "You are helping schedule a meeting. The user said: '{text}'. Generate a brief, natural response."
            ),
        }
    }
}

/// Produces a reply for `text`. Never fails.
#[async_trait]
pub trait FallbackResponder: Send + Sync {
    async fn generate(&self, text: &str, kind: ResponseKind) -> String;
}

/// Always answers with the canned reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFallback;

#[async_trait]
impl FallbackResponder for StaticFallback {
    async fn generate(&self, _text: &str, kind: ResponseKind) -> String {
        kind.canned().to_string()
    }
}

/// Configuration for the local Ollama endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// Ollama HTTP API base URL.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// When false, only canned replies are used.
    #[serde(default)]
    pub enabled: bool,
}

fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "phi3:mini".into()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            enabled: false,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Fallback backed by a local Ollama model.
pub struct OllamaFallback {
    client: reqwest::Client,
    config: FallbackConfig,
}

impl OllamaFallback {
    pub fn new(config: FallbackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build ollama client, using defaults");
                reqwest::Client::new()
            });
        Self { client, config }
    }

    async fn request(&self, text: &str, kind: ResponseKind) -> Option<String> {
        let url = format!("{}/api/generate", self.config.host);
        let prompt = kind.prompt(text);
        let body = GenerateRequest {
            model: &self.config.model,
            prompt: &prompt,
            stream: false,
        };

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "ollama request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "ollama returned non-200");
            return None;
        }

        let generated: GenerateResponse = match response.json().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse ollama response body");
                return None;
            }
        };

        let text = generated.response.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[async_trait]
impl FallbackResponder for OllamaFallback {
    async fn generate(&self, text: &str, kind: ResponseKind) -> String {
        if !self.config.enabled {
            return kind.canned().to_string();
        }
        match self.request(text, kind).await {
            Some(reply) => reply,
            None => kind.canned().to_string(),
        }
    }
}
