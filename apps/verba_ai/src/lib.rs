pub mod correction;
pub mod serializers;
pub mod upstream;
pub mod urls;
pub mod views;

use std::time::Duration;

use anyhow::{Context, Result};
use verba_core::TokenCodec;

pub use upstream::{CompletionClient, UpstreamError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Clone)]
pub struct CompletionCfg {
    /// Provider key sent as the upstream bearer credential. Set with OPENAI_API_KEY.
    pub api_key: String,
    /// Override with OPENAI_BASE_URL.
    pub base_url: String,
    /// Override with OPENAI_MODEL.
    pub model: String,
    /// Whole-request timeout (default 20s). Override with UPSTREAM_TIMEOUT_SECS.
    pub timeout: Duration,
}

impl CompletionCfg {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or(DEFAULT_BASE_URL.into());
        let model = std::env::var("OPENAI_MODEL").unwrap_or(DEFAULT_MODEL.into());
        let timeout_secs = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Clone)]
pub struct GrammarState {
    /// Checks the caller's bearer token; shared with the auth app.
    pub tokens: TokenCodec,
    pub completion: CompletionClient,
}
