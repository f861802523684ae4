//! Companion reply pipeline.
//!
//! Provides the [`ReplyProvider`] trait over LLM backends and the
//! [`CompanionChain`] that tries them in order: a local Ollama instance
//! first, then an OpenAI-compatible API when a key is configured. The chain
//! never propagates backend failures to the chat flow — the reflective reply
//! degrades to a fixed placeholder, and the tag/weather prompts degrade to
//! "no suggestion".

pub mod ollama;
pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::CompanionConfig;
use crate::journal::store::MAX_TAGS;

/// Reply returned when no backend is reachable. The chat flow still
/// completes and the entry is still written.
pub const FALLBACK_REPLY: &str =
    "No language model backend is available. You can still journal manually; entries will be saved.";

/// Token a backend uses to decline a tag or weather suggestion.
const NO_SUGGESTION: &str = "none";

/// A text-generation backend.
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generate a completion for `prompt`. Errors mean "try the next
    /// backend" — the chain, not the provider, decides what degradation
    /// looks like.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Cheap reachability check for the status endpoint.
    async fn probe(&self) -> Result<()>;
}

/// Ordered fallback chain over [`ReplyProvider`]s.
pub struct CompanionChain {
    providers: Vec<Box<dyn ReplyProvider>>,
}

impl CompanionChain {
    pub fn new(providers: Vec<Box<dyn ReplyProvider>>) -> Self {
        Self { providers }
    }

    /// Build the configured chain: Ollama always, OpenAI when a key is set.
    pub fn from_config(config: &CompanionConfig) -> Self {
        let mut providers: Vec<Box<dyn ReplyProvider>> = vec![Box::new(
            ollama::OllamaProvider::new(&config.ollama_url, &config.ollama_model),
        )];
        if !config.openai_api_key.is_empty() {
            providers.push(Box::new(openai::OpenAiProvider::new(
                &config.openai_api_key,
                &config.openai_model,
            )));
        }
        Self::new(providers)
    }

    /// A reflective reply to a journal message. Never fails: when every
    /// backend errors the fixed placeholder comes back instead.
    pub async fn reply(&self, user_message: &str) -> String {
        self.generate(&reflection_prompt(user_message))
            .await
            .unwrap_or_else(|| FALLBACK_REPLY.to_string())
    }

    /// Best-effort tag suggestions; empty on failure or when the backend
    /// declines.
    pub async fn suggest_tags(&self, user_message: &str) -> Vec<String> {
        match self.generate(&tag_prompt(user_message)).await {
            Some(response) => parse_tag_response(&response),
            None => Vec::new(),
        }
    }

    /// Best-effort weather line; `None` on failure or when the message says
    /// nothing about the weather.
    pub async fn infer_weather(&self, user_message: &str) -> Option<String> {
        let response = self.generate(&weather_prompt(user_message)).await?;
        parse_weather_response(&response)
    }

    /// Name of the first backend that currently answers, if any.
    pub async fn probe(&self) -> Option<&'static str> {
        for provider in &self.providers {
            if provider.probe().await.is_ok() {
                return Some(provider.name());
            }
        }
        None
    }

    /// First backend to produce a non-empty completion, in chain order.
    async fn generate(&self, prompt: &str) -> Option<String> {
        for provider in &self.providers {
            match provider.generate(prompt).await {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        return Some(text.to_string());
                    }
                    debug!(provider = provider.name(), "empty completion, trying next");
                }
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "backend failed, trying next");
                }
            }
        }
        None
    }
}

fn reflection_prompt(user_message: &str) -> String {
    format!(
        "User journal entry:\n{user_message}\n\n\
         Respond with a short, supportive reflection and, if relevant, \
         note any trackable symptoms or triggers."
    )
}

fn tag_prompt(user_message: &str) -> String {
    format!(
        "User journal entry:\n{user_message}\n\n\
         Suggest up to five short lowercase topic tags for this entry as a \
         comma-separated list. Reply with the word none if no tag applies."
    )
}

fn weather_prompt(user_message: &str) -> String {
    format!(
        "User journal entry:\n{user_message}\n\n\
         If the entry mentions the weather, describe it in one short line. \
         Reply with the word none otherwise."
    )
}

/// Parse a comma- or newline-separated tag list out of a completion.
fn parse_tag_response(response: &str) -> Vec<String> {
    response
        .split(|c| c == ',' || c == '\n')
        .map(|tag| {
            tag.trim()
                .trim_start_matches(['-', '*', '#'])
                .trim()
                .to_lowercase()
        })
        .filter(|tag| !tag.is_empty() && tag.as_str() != NO_SUGGESTION)
        .take(MAX_TAGS)
        .collect()
}

fn parse_weather_response(response: &str) -> Option<String> {
    let line = response.lines().next()?.trim();
    if line.is_empty() || line.eq_ignore_ascii_case(NO_SUGGESTION) {
        return None;
    }
    Some(line.to_string())
}
