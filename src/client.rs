use crate::error::{RefactorError, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "nvidia/nemotron-3-nano-30b-a3b:free";

/// Anything that can turn a system instruction and a user prompt into raw
/// model text.
///
/// The extraction pipeline only ever sees the returned string; retries and
/// provider fallback belong to the implementor.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Configuration for an OpenAI-compatible chat-completions provider.
#[derive(Clone)]
pub struct LlmConfig {
    /// Full chat-completions URL.
    pub endpoint: String,

    /// Model identifier sent in the request body.
    pub model: String,

    /// Bearer token. `None` sends no `Authorization` header.
    pub api_key: Option<String>,

    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 1024,
            timeout: Duration::from_secs(60),
        }
    }
}

impl LlmConfig {
    /// Defaults overridden by `REFACTOR_LLM_ENDPOINT`, `REFACTOR_LLM_MODEL`
    /// and `REFACTOR_LLM_API_KEY` when they are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("REFACTOR_LLM_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("REFACTOR_LLM_MODEL") {
            config.model = model;
        }
        config.api_key = std::env::var("REFACTOR_LLM_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        config
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`TextGenerator`] backed by a chat-completions HTTP endpoint
/// (OpenRouter, the Hugging Face router, a local server, ...).
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(http: Client, config: LlmConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send one chat completion and return the raw reply text.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = build_body(&self.config, system_prompt, user_prompt);
        log::debug!(
            "Requesting chat completion from {} with model {}",
            self.config.endpoint,
            self.config.model
        );

        let mut request = self
            .http
            .post(&self.config.endpoint)
            .timeout(self.config.timeout)
            .json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(RefactorError::Provider {
                status,
                message: provider_error_message(status, &text),
            });
        }

        let json: Value = resp.json().await?;
        let content = extract_content(&json);
        if content.trim().is_empty() {
            return Err(RefactorError::EmptyResponse);
        }
        Ok(content)
    }
}

impl TextGenerator for ChatClient {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.complete(system_prompt, user_prompt).await
    }
}

/// Request body for a chat completion.
fn build_body(config: &LlmConfig, system_prompt: &str, user_prompt: &str) -> Value {
    let mut messages = vec![];
    if !system_prompt.is_empty() {
        messages.push(json!({"role": "system", "content": system_prompt}));
    }
    messages.push(json!({"role": "user", "content": user_prompt}));

    json!({
        "model": config.model,
        "messages": messages,
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
    })
}

/// Reply text from a chat-completions response.
///
/// Some models leave `content` empty and put their output in `reasoning`.
fn extract_content(response: &Value) -> String {
    let message = response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"));

    let field = |name: &str| {
        message
            .and_then(|m| m.get(name))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    };

    field("content")
        .or_else(|| field("reasoning"))
        .unwrap_or("")
        .to_string()
}

/// Best-effort error message from a failed provider response body.
///
/// Understands `{"error": {"message": "..."}}` and `{"error": "..."}`.
fn provider_error_message(status: u16, body: &str) -> String {
    let fallback = format!("HTTP {}", status);
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return fallback;
    };
    match json.get("error") {
        Some(Value::String(msg)) => msg.clone(),
        Some(err) => err
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
            .unwrap_or(fallback),
        None => fallback,
    }
}
