//! Ollama backend — non-streaming `/api/generate` against a local instance.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::ReplyProvider;

pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl OllamaProvider {
    pub fn new(url: &str, model: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ReplyProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.url))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await
            .context("ollama request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("ollama returned {status}: {body}");
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .context("ollama response was not valid JSON")?;
        match payload.response {
            Some(text) => Ok(text),
            None => bail!("ollama response had no 'response' field"),
        }
    }

    async fn probe(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.url))
            .send()
            .await
            .context("ollama unreachable")?;
        if !response.status().is_success() {
            bail!("ollama returned {}", response.status());
        }
        Ok(())
    }
}
