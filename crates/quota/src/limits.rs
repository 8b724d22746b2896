use serde::{Deserialize, Serialize};

/// Per-provider rate/token/cost limits (§4.2 "Default limits").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderLimits {
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
    pub tokens_per_minute: Option<u64>,
    pub tokens_per_day: Option<u64>,
    pub cost_per_1k_tokens: Option<f64>,
    pub max_concurrent: u32,
    /// Seconds a throttle lasts once triggered by a provider rate-limit error.
    pub throttle_duration_secs: i64,
    pub auto_throttle: bool,
}

impl ProviderLimits {
    /// Generic default inherited by providers with no bespoke entry below.
    pub fn generic() -> Self {
        Self {
            requests_per_minute: 30,
            requests_per_hour: 1_500,
            tokens_per_minute: None,
            tokens_per_day: None,
            cost_per_1k_tokens: None,
            max_concurrent: 5,
            throttle_duration_secs: 60,
            auto_throttle: true,
        }
    }

    /// Default limits per known provider (§4.2).
    pub fn for_provider(provider: &str) -> Self {
        match provider.to_lowercase().as_str() {
            "openai" => Self {
                requests_per_minute: 60,
                requests_per_hour: 3_500,
                tokens_per_minute: Some(90_000),
                tokens_per_day: Some(1_000_000),
                cost_per_1k_tokens: Some(0.03),
                max_concurrent: 10,
                throttle_duration_secs: 60,
                auto_throttle: true,
            },
            "anthropic" => Self {
                requests_per_minute: 50,
                requests_per_hour: 3_000,
                tokens_per_minute: Some(80_000),
                tokens_per_day: Some(900_000),
                cost_per_1k_tokens: Some(0.015),
                max_concurrent: 8,
                throttle_duration_secs: 60,
                auto_throttle: true,
            },
            "gemini" => Self {
                requests_per_minute: 60,
                requests_per_hour: 3_000,
                tokens_per_minute: Some(120_000),
                tokens_per_day: Some(1_500_000),
                cost_per_1k_tokens: Some(0.0035),
                max_concurrent: 10,
                throttle_duration_secs: 45,
                auto_throttle: true,
            },
            "deepseek" => Self {
                requests_per_minute: 60,
                requests_per_hour: 3_000,
                tokens_per_minute: Some(100_000),
                tokens_per_day: Some(2_000_000),
                cost_per_1k_tokens: Some(0.0014),
                max_concurrent: 10,
                throttle_duration_secs: 45,
                auto_throttle: true,
            },
            "grok" | "xai" => Self {
                requests_per_minute: 40,
                requests_per_hour: 2_000,
                tokens_per_minute: Some(60_000),
                tokens_per_day: Some(800_000),
                cost_per_1k_tokens: Some(0.02),
                max_concurrent: 6,
                throttle_duration_secs: 60,
                auto_throttle: true,
            },
            "qwen" => Self {
                requests_per_minute: 60,
                requests_per_hour: 3_000,
                tokens_per_minute: Some(100_000),
                tokens_per_day: Some(1_500_000),
                cost_per_1k_tokens: Some(0.002),
                max_concurrent: 10,
                throttle_duration_secs: 45,
                auto_throttle: true,
            },
            "kimi" | "moonshot" => Self {
                requests_per_minute: 50,
                requests_per_hour: 2_500,
                tokens_per_minute: Some(80_000),
                tokens_per_day: Some(1_000_000),
                cost_per_1k_tokens: Some(0.002),
                max_concurrent: 8,
                throttle_duration_secs: 45,
                auto_throttle: true,
            },
            _ => Self::generic(),
        }
    }
}
