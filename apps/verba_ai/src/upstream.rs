//! Client for the upstream completion API.
//!
//! One POST per grammar check, no retries. The provider key travels as the
//! upstream bearer credential and is never logged.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use verba_core::ApiError;

use crate::serializers::chat_completion::{ChatMessage, ChatReq};
use crate::CompletionCfg;

pub const SYSTEM_PROMPT: &str = r#"You are a grammar and spelling checker. Analyze the provided text and return a JSON response with the following structure:
{
  "correctedText": "the corrected version of the text",
  "errors": [
    {
      "word": "incorrect word",
      "suggestion": "correct word",
      "type": "grammar|spelling",
      "position": "position in text"
    }
  ]
}
Only return the JSON, no additional text."#;

pub const TEMPERATURE: f32 = 0.1;
pub const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("provider rejected the API key")]
    Unauthorized,
    #[error("provider rate limit exceeded")]
    RateLimited,
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
    #[error("provider returned HTTP {0}")]
    Status(StatusCode),
    #[error("provider request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unauthorized => ApiError::UpstreamAuth,
            UpstreamError::RateLimited => ApiError::RateLimited,
            UpstreamError::Timeout(_) => ApiError::GatewayTimeout,
            other => ApiError::Proxy(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct CompletionClient {
    http: Client,
    cfg: Arc<CompletionCfg>,
}

impl CompletionClient {
    pub fn new(cfg: CompletionCfg) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            http,
            cfg: Arc::new(cfg),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.cfg.base_url.trim_end_matches('/'))
    }

    /// Sends `text` for correction and returns the raw response body.
    ///
    /// The body is returned unparsed: deciding what to do with a body that
    /// is not the expected JSON belongs to [`crate::correction::reconcile`].
    pub async fn complete(&self, text: &str) -> Result<String, UpstreamError> {
        let req = ChatReq {
            model: &self.cfg.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.cfg.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(UpstreamError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(UpstreamError::RateLimited),
            s if !s.is_success() => {
                let detail = response.text().await.unwrap_or_default();
                warn!(status = s.as_u16(), body = %truncate(&detail, 200), "completion API error");
                return Err(UpstreamError::Status(s));
            }
            _ => {}
        }

        let body = response.text().await.map_err(|e| self.transport(e))?;
        debug!(bytes = body.len(), "completion received");
        Ok(body)
    }

    fn transport(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.cfg.timeout)
        } else {
            UpstreamError::Transport(e)
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
