//! A generic OpenAI-compatible HTTP [`Supervisor`] (§4.1 "custom
//! OpenAI-compatible"). Real per-provider SDKs are explicitly out of scope
//! (§1) — this is the one concrete implementation the CLI needs to actually
//! run a debate, grounded on the teacher's `reqwest`-based chat clients in
//! `crates/llm/src/lib.rs`.

use std::time::Duration;

use async_trait::async_trait;
use council_core::{Message, Role};
use serde::{Deserialize, Serialize};

use crate::{Supervisor, SupervisorError};

#[derive(Debug, Clone)]
pub struct HttpSupervisorConfig {
    pub name: String,
    pub provider: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
}

/// A supervisor that talks to any OpenAI-`/chat/completions`-shaped
/// endpoint: OpenAI itself, and the several "OpenAI-compatible" providers
/// named in §6 (deepseek, gemini via compat shim, grok/xai, qwen, kimi).
pub struct HttpSupervisor {
    config: HttpSupervisorConfig,
    client: reqwest::Client,
}

impl HttpSupervisor {
    pub fn new(config: HttpSupervisorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl Supervisor for HttpSupervisor {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }

    async fn chat(&self, messages: &[Message]) -> Result<String, SupervisorError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage { role: wire_role(m.role), content: m.content.clone() })
                .collect(),
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let mut request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                SupervisorError::Timeout { provider: self.config.provider.clone(), timeout_ms: self.config.timeout_ms }
            } else {
                SupervisorError::Transport { provider: self.config.provider.clone(), message: err.to_string() }
            }
        })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SupervisorError::RateLimited { provider: self.config.provider.clone() });
        }
        if !response.status().is_success() {
            return Err(SupervisorError::Transport {
                provider: self.config.provider.clone(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| SupervisorError::Transport { provider: self.config.provider.clone(), message: err.to_string() })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SupervisorError::Transport {
                provider: self.config.provider.clone(),
                message: "empty response".to_string(),
            })
    }

    async fn available(&self) -> bool {
        self.config.api_key.is_some()
    }
}
