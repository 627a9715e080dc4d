//! Completion client for Groq's OpenAI-compatible chat endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BriefingError, Result};
use crate::prompt::Prompt;

use super::{CompletionClient, Sampling};

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default extraction model.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageBody,
}

#[derive(Debug, Deserialize)]
struct ChatMessageBody {
    content: String,
}

/// Client for the Groq chat completions API.
///
/// One `complete` call maps to one POST against `/chat/completions`; the
/// request never streams and is bounded by the configured timeout.
pub struct GroqClient {
    api_key: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GroqClient {
    /// Creates a client bound to one model and one per-call deadline.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BriefingError::CompletionNetwork(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: timeout.as_secs(),
            client,
        })
    }

    fn build_request(&self, prompt: &Prompt, sampling: &Sampling) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            top_p: sampling.top_p,
            stream: false,
        }
    }

    fn classify_transport(&self, e: reqwest::Error) -> BriefingError {
        if e.is_timeout() {
            BriefingError::CompletionTimeout(self.timeout_secs)
        } else {
            BriefingError::CompletionNetwork(e.to_string())
        }
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, prompt: &Prompt, sampling: &Sampling) -> Result<String> {
        let body = self.build_request(prompt, sampling);
        let url = format!("{}/chat/completions", GROQ_API_BASE);

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => BriefingError::CompletionAuth(body),
                429 => BriefingError::CompletionRateLimit(body),
                code => BriefingError::CompletionUpstream { status: code, body },
            });
        }

        let parsed: ChatResponse = res.json().await.map_err(|e| {
            BriefingError::CompletionUpstream {
                status: status.as_u16(),
                body: format!("undecodable completion response: {}", e),
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| BriefingError::CompletionUpstream {
                status: status.as_u16(),
                body: "completion response carried no choices".to_string(),
            })
    }
}
