//! OpenAI-compatible fallback backend — chat completions with a fixed
//! system prompt.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::ReplyProvider;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODELS_URL: &str = "https://api.openai.com/v1/models";
const SYSTEM_PROMPT: &str = "You are a calm journaling companion.";

pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
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

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ReplyProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": prompt},
                ],
            }))
            .send()
            .await
            .context("openai request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("openai returned {status}: {body}");
        }

        let payload: ChatResponse = response
            .json()
            .await
            .context("openai response was not valid JSON")?;
        match payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
        {
            Some(text) => Ok(text),
            None => bail!("openai response had no message content"),
        }
    }

    async fn probe(&self) -> Result<()> {
        let response = self
            .client
            .get(MODELS_URL)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("openai unreachable")?;
        if !response.status().is_success() {
            bail!("openai returned {}", response.status());
        }
        Ok(())
    }
}
