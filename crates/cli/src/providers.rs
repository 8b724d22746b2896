//! Builds [`HttpSupervisor`]s from the environment-key contract in §6:
//! `{PROVIDER}_API_KEY` / `{PROVIDER}_MODEL` for the seven known providers.

use std::sync::Arc;

use council_supervisor::{HttpSupervisor, HttpSupervisorConfig, Supervisor};

struct ProviderDefaults {
    env_prefix: &'static str,
    base_url: &'static str,
    default_model: &'static str,
}

const KNOWN_PROVIDERS: &[ProviderDefaults] = &[
    ProviderDefaults { env_prefix: "OPENAI", base_url: "https://api.openai.com/v1", default_model: "gpt-4o" },
    ProviderDefaults { env_prefix: "ANTHROPIC", base_url: "https://api.anthropic.com/v1", default_model: "claude-3-5-sonnet-latest" },
    ProviderDefaults { env_prefix: "DEEPSEEK", base_url: "https://api.deepseek.com/v1", default_model: "deepseek-chat" },
    ProviderDefaults { env_prefix: "GEMINI", base_url: "https://generativelanguage.googleapis.com/v1beta/openai", default_model: "gemini-1.5-pro" },
    ProviderDefaults { env_prefix: "GROK", base_url: "https://api.x.ai/v1", default_model: "grok-2-latest" },
    ProviderDefaults { env_prefix: "QWEN", base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1", default_model: "qwen-max" },
    ProviderDefaults { env_prefix: "KIMI", base_url: "https://api.moonshot.cn/v1", default_model: "moonshot-v1-8k" },
];

/// One [`Supervisor`] per provider with an `{PREFIX}_API_KEY` set in the
/// environment. Supervisor names are the lower-cased provider tag.
pub fn supervisors_from_env(timeout_ms: u64) -> Vec<Arc<dyn Supervisor>> {
    let mut out = Vec::new();
    for provider in KNOWN_PROVIDERS {
        let Ok(api_key) = std::env::var(format!("{}_API_KEY", provider.env_prefix)) else { continue };
        let model = std::env::var(format!("{}_MODEL", provider.env_prefix)).unwrap_or_else(|_| provider.default_model.to_string());
        let name = provider.env_prefix.to_lowercase();
        let config = HttpSupervisorConfig {
            name: name.clone(),
            provider: name,
            base_url: provider.base_url.to_string(),
            api_key: Some(api_key),
            model,
            timeout_ms,
        };
        out.push(Arc::new(HttpSupervisor::new(config)) as Arc<dyn Supervisor>);
    }
    out
}
