//! Journal entry type definitions.
//!
//! Defines [`Entry`] (a full document view), [`EntrySummary`] (the listing
//! row), [`Exchange`] (one user/companion pair inside a body), and
//! [`JournalError`] (the storage failure taxonomy).

use serde::Serialize;
use serde_yaml::Value;

use crate::journal::frontmatter::Metadata;

/// One row in the journal listing: metadata only, no body.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub id: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub summary: String,
    /// Falls back to the on-disk filename when the document has no title.
    pub title: String,
}

/// A full journal document, body included.
///
/// Fields the store manages are typed; everything else the frontmatter
/// carried is preserved in `extra` and flattened back into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(flatten)]
    pub extra: Metadata,
    pub body: String,
}

impl Entry {
    /// Build an entry view from a decoded document.
    pub fn from_document(id: &str, mut metadata: Metadata, body: String) -> Self {
        // The id inside the frontmatter is redundant with the filename and the
        // filename is canonical.
        metadata.remove("id");
        let date = take_string(&mut metadata, "date");
        let tags = take_tags(&mut metadata);
        let summary = take_string(&mut metadata, "summary").unwrap_or_default();
        let title = take_string(&mut metadata, "title");
        let weather = take_string(&mut metadata, "weather");
        Self {
            id: id.to_string(),
            date,
            tags,
            summary,
            title,
            weather,
            extra: metadata,
            body,
        }
    }

    pub fn summary_row(&self) -> EntrySummary {
        EntrySummary {
            id: self.id.clone(),
            date: self.date.clone(),
            tags: self.tags.clone(),
            summary: self.summary.clone(),
            title: self
                .title
                .clone()
                .unwrap_or_else(|| format!("{}.md", self.id)),
        }
    }
}

/// One user-message/companion-reply pair parsed out of an entry body.
///
/// Bodies hold exchanges as `---`-separated blocks: an optional `###`
/// timestamp heading, a `**You:**` section, and an `**Agent:**` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub timestamp: Option<String>,
    pub user: String,
    pub agent: String,
}

const YOU_MARKER: &str = "**You:**";
const AGENT_MARKER: &str = "**Agent:**";

impl Exchange {
    /// Parse all exchange blocks out of a body. Segments without either
    /// section marker (e.g. the `# Entry` preamble) are skipped.
    pub fn parse_blocks(body: &str) -> Vec<Exchange> {
        split_on_rules(body)
            .into_iter()
            .filter_map(|segment| Self::parse_segment(&segment))
            .collect()
    }

    fn parse_segment(segment: &str) -> Option<Exchange> {
        let you_at = segment.find(YOU_MARKER);
        let agent_at = segment.find(AGENT_MARKER);
        if you_at.is_none() && agent_at.is_none() {
            return None;
        }

        let timestamp = segment
            .lines()
            .find_map(|line| line.trim().strip_prefix("### "))
            .map(|s| s.trim().to_string());

        let user = match (you_at, agent_at) {
            (Some(start), Some(end)) if start < end => {
                segment[start + YOU_MARKER.len()..end].trim().to_string()
            }
            (Some(start), _) => segment[start + YOU_MARKER.len()..].trim().to_string(),
            (None, _) => String::new(),
        };
        let agent = agent_at
            .map(|at| segment[at + AGENT_MARKER.len()..].trim().to_string())
            .unwrap_or_default();

        Some(Exchange {
            timestamp,
            user,
            agent,
        })
    }
}

/// Split a body on horizontal-rule lines (three or more hyphens alone).
fn split_on_rules(body: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'-') {
            segments.push(std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    segments.push(current);
    segments.retain(|s| !s.trim().is_empty());
    segments
}

/// Receipt returned to the chat caller after a successful append.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeReceipt {
    pub id: String,
    pub user: String,
    pub agent: String,
}

/// Storage failure taxonomy.
///
/// Single-file problems never surface here — unreadable or unparsable
/// documents are skipped by reads and rescued by appends. These variants are
/// the wholesale failures.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("journal storage unavailable: {0}")]
    StorageUnavailable(#[source] std::io::Error),

    #[error("failed to write entry {id}: {source}")]
    Write {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid entry id: {0:?}")]
    InvalidId(String),

    #[error("message must not be empty")]
    EmptyMessage,
}

/// Remove a managed key from the mapping, keeping it only when it is a
/// non-empty string. Managed keys always leave `extra` so the flattened API
/// view never carries a duplicate field.
pub(crate) fn take_string(metadata: &mut Metadata, key: &str) -> Option<String> {
    match metadata.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

pub(crate) fn take_tags(metadata: &mut Metadata) -> Vec<String> {
    let tags = match metadata.remove("tags") {
        Some(Value::Sequence(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                other => other.as_i64().map(|n| n.to_string()),
            })
            .collect(),
        // A single scalar tag is tolerated the way loose hand-edited
        // frontmatter writes it.
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    };
    tags
}
