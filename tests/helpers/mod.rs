#![allow(dead_code)]

use std::path::Path;

use async_trait::async_trait;
use serde_yaml::Value;
use tempfile::TempDir;

use daybook::companion::{CompanionChain, ReplyProvider};
use daybook::journal::frontmatter::{self, Metadata};
use daybook::journal::store::JournalStore;
use daybook::versioning::VersioningSink;

/// Fresh store over a temp directory. Keep the `TempDir` alive for the test.
pub fn temp_store() -> (TempDir, JournalStore) {
    let dir = TempDir::new().unwrap();
    let store = JournalStore::new(dir.path());
    (dir, store)
}

/// Write a document directly, bypassing the store's append pipeline.
pub fn write_document(dir: &Path, id: &str, metadata: &Metadata, body: &str) {
    std::fs::write(
        dir.join(format!("{id}.md")),
        frontmatter::encode(body, metadata),
    )
    .unwrap();
}

/// Build frontmatter for a seeded document.
pub fn meta(date: Option<&str>, tags: &[&str], summary: &str) -> Metadata {
    let mut m = Metadata::new();
    if let Some(date) = date {
        m.insert("date".into(), Value::String(date.to_string()));
    }
    m.insert(
        "tags".into(),
        Value::Sequence(tags.iter().map(|t| Value::String(t.to_string())).collect()),
    );
    if !summary.is_empty() {
        m.insert("summary".into(), Value::String(summary.to_string()));
    }
    m
}

/// Provider with canned answers per prompt kind. The chain uses distinct
/// prompt templates for replies, tag suggestions, and weather inference, so
/// the dispatch keys off their wording.
pub struct ScriptedProvider {
    pub reply: String,
    pub tags: String,
    pub weather: String,
}

impl ScriptedProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            tags: "none".to_string(),
            weather: "none".to_string(),
        }
    }

    pub fn new(reply: &str, tags: &str, weather: &str) -> Self {
        Self {
            reply: reply.to_string(),
            tags: tags.to_string(),
            weather: weather.to_string(),
        }
    }
}

#[async_trait]
impl ReplyProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        if prompt.contains("topic tags") {
            Ok(self.tags.clone())
        } else if prompt.contains("weather") {
            Ok(self.weather.clone())
        } else {
            Ok(self.reply.clone())
        }
    }

    async fn probe(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Provider whose every call fails.
pub struct FailingProvider;

#[async_trait]
impl ReplyProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("backend unreachable")
    }

    async fn probe(&self) -> anyhow::Result<()> {
        anyhow::bail!("backend unreachable")
    }
}

pub fn chain(provider: ScriptedProvider) -> CompanionChain {
    CompanionChain::new(vec![Box::new(provider)])
}

pub fn dead_chain() -> CompanionChain {
    CompanionChain::new(vec![Box::new(FailingProvider)])
}

pub fn sink() -> VersioningSink {
    VersioningSink::disabled()
}
