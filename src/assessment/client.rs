//! Transport to a chat-completion service.

use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use ureq::{Agent, AgentBuilder};

/// Sends one prompt and returns the text of the reply.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible `POST {endpoint}/chat/completions` client.
pub struct ChatCompletionsClient {
    pub endpoint: String,
    pub model: String,
    api_key: String,
    agent: Agent,
}

impl ChatCompletionsClient {
    pub const TEMPERATURE: f64 = 0.1;
    pub const MAX_TOKENS: u32 = 2048;

    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(anyhow!("Invalid endpoint URL: {}", endpoint));
        }

        let agent = AgentBuilder::new().timeout(timeout).build();
        Ok(Self {
            endpoint,
            model: model.into(),
            api_key: api_key.into(),
            agent,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": Self::TEMPERATURE,
            "max_tokens": Self::MAX_TOKENS,
        })
    }
}

impl CompletionClient for ChatCompletionsClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        tracing::debug!(%url, model = %self.model, "requesting assessment");

        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(self.request_body(prompt))
            .map_err(|e| match e {
                ureq::Error::Status(401, _) => {
                    anyhow!("Authentication failed. Check the assessment API key")
                }
                ureq::Error::Status(code, resp) => {
                    anyhow!("HTTP {}: {}", code, resp.status_text())
                }
                other => anyhow!("HTTP request failed: {}", other),
            })?;

        let json: serde_json::Value = response
            .into_json()
            .context("Failed to decode assessment response")?;

        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Assessment response has no message content"))
    }
}
