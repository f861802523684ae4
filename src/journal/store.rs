//! Entry repository — the on-disk journal collection.
//!
//! [`JournalStore`] owns a flat directory of `YYYY-MM-DD.md` documents
//! (legacy per-message files carry a random suffix and are read like any
//! other id). Reads are fail-safe-skip: a single unreadable or unparsable
//! document is logged and dropped from results, never modified. The write
//! path, [`JournalStore::append_exchange`], merges additively into today's
//! document under a per-document lock.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use serde_yaml::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::companion::CompanionChain;
use crate::journal::frontmatter::{self, Metadata};
use crate::journal::types::{take_tags, Entry, EntrySummary, ExchangeReceipt, JournalError};
use crate::versioning::VersioningSink;

/// Upper bound on stored tags per entry.
pub const MAX_TAGS: usize = 12;
/// Upper bound on the stored summary, in characters.
pub const SUMMARY_MAX_CHARS: usize = 140;

const ENTRY_EXTENSION: &str = "md";
const EMPTY_TEMPLATE: &str = "# Entry\n\n";

pub struct JournalStore {
    dir: PathBuf,
    // Per-document append locks, created on first use. Guards the
    // read-merge-write sequence against a concurrent append to the same day.
    append_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JournalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            append_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Entry summaries sorted by date descending, entries without a date
    /// last. Skips (and logs) documents that fail to read or parse; fails
    /// only when the directory itself is unreadable.
    pub fn list_entries(&self) -> Result<Vec<EntrySummary>, JournalError> {
        let mut entries: Vec<EntrySummary> =
            self.load_all()?.iter().map(Entry::summary_row).collect();
        entries.sort_by(|a, b| {
            b.date
                .as_deref()
                .unwrap_or("")
                .cmp(a.date.as_deref().unwrap_or(""))
        });
        Ok(entries)
    }

    /// Fetch one entry by id, body included. Absent, unreadable, and
    /// unparsable documents all come back as `None` — not-found is a result,
    /// not an error.
    pub fn entry_by_id(&self, id: &str) -> Option<Entry> {
        let path = self.entry_path(id)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(id, error = %err, "entry unreadable");
                }
                return None;
            }
        };
        match frontmatter::decode(&raw) {
            Ok((metadata, body)) => Some(Entry::from_document(id, metadata, body)),
            Err(err) => {
                warn!(id, error = %err, "entry failed to parse, treating as not found");
                None
            }
        }
    }

    /// Append one exchange to today's document.
    pub async fn append_exchange(
        &self,
        user_message: &str,
        companion: &CompanionChain,
        sink: &VersioningSink,
    ) -> Result<ExchangeReceipt, JournalError> {
        self.append_exchange_at(&today_id(), user_message, companion, sink)
            .await
    }

    /// Append one exchange to the document named `day_id`.
    ///
    /// Full pipeline: companion calls → per-document lock → load-or-rescue →
    /// additive merge → persist → enqueue versioning commit. The companion
    /// calls happen before the lock so a slow backend never serializes
    /// unrelated appends.
    pub async fn append_exchange_at(
        &self,
        day_id: &str,
        user_message: &str,
        companion: &CompanionChain,
        sink: &VersioningSink,
    ) -> Result<ExchangeReceipt, JournalError> {
        let message = user_message.trim();
        if message.is_empty() {
            return Err(JournalError::EmptyMessage);
        }
        let path = self
            .entry_path(day_id)
            .ok_or_else(|| JournalError::InvalidId(day_id.to_string()))?;

        // 1. Companion calls. The reply never fails (worst case is the fixed
        //    placeholder); tags and weather are best-effort suggestions.
        let reply = companion.reply(message).await;
        let suggested_tags = companion.suggest_tags(message).await;
        let weather_hint = companion.infer_weather(message).await;

        // 2. Serialize with other appends to the same document.
        let lock = self.append_lock(day_id).await;
        let _guard = lock.lock().await;

        // 3. Load the existing document, if any.
        let (mut metadata, mut body) = self.load_for_append(&path, day_id)?;

        // 4. Merge metadata. Managed fields only; everything else the
        //    document carried stays untouched.
        metadata.insert("id".into(), Value::String(day_id.to_string()));
        metadata
            .entry("date".to_string())
            .or_insert_with(|| Value::String(day_id.to_string()));

        let existing_tags = take_tags(&mut metadata);
        let merged = merge_tags(&existing_tags, &suggested_tags);
        metadata.insert(
            "tags".into(),
            Value::Sequence(merged.into_iter().map(Value::String).collect()),
        );

        if let Some(hint) = weather_hint {
            if !has_weather(&metadata) {
                metadata.insert("weather".into(), Value::String(hint));
            }
        }

        metadata.insert("summary".into(), Value::String(truncate_summary(&reply)));

        // 5. Append the new exchange block.
        let stamp = Local::now().format("%H:%M");
        body.push_str(&format!(
            "\n\n---\n\n### {stamp}\n\n**You:** {message}\n\n**Agent:** {reply}\n"
        ));

        // 6. Persist.
        fs::create_dir_all(&self.dir).map_err(JournalError::StorageUnavailable)?;
        fs::write(&path, frontmatter::encode(&body, &metadata)).map_err(|source| {
            JournalError::Write {
                id: day_id.to_string(),
                source,
            }
        })?;

        // 7. Version the change. Fire-and-forget: the data is already
        //    durable, so the sink's outcome does not affect the result.
        sink.commit(format!("journal: append exchange to {day_id}"));

        Ok(ExchangeReceipt {
            id: day_id.to_string(),
            user: message.to_string(),
            agent: reply,
        })
    }

    /// Read every parseable document, in filename order.
    pub fn load_all(&self) -> Result<Vec<Entry>, JournalError> {
        let dir_entries = match fs::read_dir(&self.dir) {
            Ok(iter) => iter,
            // A journal that has never been written to is empty, not broken.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(JournalError::StorageUnavailable(err)),
        };

        let mut files: Vec<PathBuf> = dir_entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION))
            .collect();
        files.sort();

        let mut entries = Vec::with_capacity(files.len());
        for path in files {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(id, error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            match frontmatter::decode(&raw) {
                Ok((metadata, body)) => entries.push(Entry::from_document(&id, metadata, body)),
                Err(err) => warn!(id, error = %err, "skipping unparsable entry"),
            }
        }
        Ok(entries)
    }

    /// Resolve an id to its document path. Ids are bare filenames; anything
    /// that could walk out of the journal directory resolves to nothing.
    fn entry_path(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty()
            || id.starts_with('.')
            || id.contains('/')
            || id.contains('\\')
            || id.contains("..")
        {
            return None;
        }
        Some(self.dir.join(format!("{id}.{ENTRY_EXTENSION}")))
    }

    fn load_for_append(
        &self,
        path: &Path,
        day_id: &str,
    ) -> Result<(Metadata, String), JournalError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok((Metadata::new(), EMPTY_TEMPLATE.to_string()));
            }
            // An existing-but-unreadable document must not be clobbered by a
            // fresh template; refuse the append instead.
            Err(err) => return Err(JournalError::StorageUnavailable(err)),
        };
        match frontmatter::decode(&raw) {
            Ok(doc) => Ok(doc),
            Err(err) => {
                warn!(id = day_id, error = %err, "existing document unparsable, rescuing to sidecar");
                self.rescue_unparsable(path, &raw, day_id)?;
                Ok((Metadata::new(), EMPTY_TEMPLATE.to_string()))
            }
        }
    }

    /// Preserve an unparsable document before the append restarts from the
    /// empty template. The sidecar has no `.md` extension, so listings and
    /// search never pick it up; `daybook scan` reports it.
    fn rescue_unparsable(&self, path: &Path, raw: &str, day_id: &str) -> Result<(), JournalError> {
        let sidecar = path.with_extension("md.unparsed");
        fs::write(&sidecar, raw).map_err(|source| JournalError::Write {
            id: day_id.to_string(),
            source,
        })?;
        debug!(sidecar = %sidecar.display(), "rescued unparsable document");
        Ok(())
    }

    async fn append_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.append_locks.lock().await;
        locks.entry(id.to_string()).or_default().clone()
    }
}

/// Today's entry id in the repository's date format, local calendar.
pub fn today_id() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Merge suggested tags into existing ones: lowercase, case-insensitive
/// dedup, existing order first, capped at [`MAX_TAGS`].
pub fn merge_tags(existing: &[String], suggested: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for tag in existing.iter().chain(suggested) {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || !seen.insert(tag.clone()) {
            continue;
        }
        if merged.len() == MAX_TAGS {
            break;
        }
        merged.push(tag);
    }
    merged
}

/// First [`SUMMARY_MAX_CHARS`] characters of a reply, whole chars only.
pub fn truncate_summary(reply: &str) -> String {
    reply.chars().take(SUMMARY_MAX_CHARS).collect()
}

fn has_weather(metadata: &Metadata) -> bool {
    matches!(metadata.get("weather"), Some(Value::String(s)) if !s.trim().is_empty())
}
