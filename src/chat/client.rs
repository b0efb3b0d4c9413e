use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::GeminiConfig;

// Kept out of the URL so transport errors never carry the key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Remote text-completion model used for follow-up nutrition questions.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("build gemini http client")?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

fn extract_text(body: &Value) -> anyhow::Result<String> {
    if let Some(msg) = body["error"]["message"].as_str() {
        return Err(anyhow!("gemini: {}", msg));
    }
    body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("invalid gemini response format"))
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let body: Value = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }]
            }))
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("gemini generateContent request")?
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("gemini generateContent response")?;

        extract_text(&body)
    }
}
