//! Per-request journal search.
//!
//! No persistent index: every call scans the parseable documents and derives
//! filtered, excerpted results. At journal scale (one document per day) the
//! scan is cheaper than keeping an index honest.

use serde::Serialize;

use crate::journal::store::JournalStore;
use crate::journal::types::{Entry, JournalError};

/// Characters of context kept before the first query match.
const EXCERPT_LEAD: usize = 60;
/// Total excerpt window, in characters of the source body.
const EXCERPT_WINDOW: usize = 180;

#[derive(Debug, Default, Clone)]
pub struct SearchQuery {
    /// Free-text needle; empty matches everything.
    pub query: String,
    /// Every requested tag must be present (AND, not OR).
    pub tags: Vec<String>,
    /// Inclusive `YYYY-MM-DD` lower bound.
    pub date_from: Option<String>,
    /// Inclusive `YYYY-MM-DD` upper bound.
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub summary: String,
    pub excerpt: String,
}

/// Scan all entries and return matches, date descending, ties in scan order.
pub fn search(store: &JournalStore, query: &SearchQuery) -> Result<Vec<SearchHit>, JournalError> {
    let needle = query.query.trim().to_lowercase();
    let wanted_tags: Vec<String> = query
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut hits = Vec::new();
    for entry in store.load_all()? {
        let body_lower = entry.body.to_lowercase();
        if !matches(&entry, &body_lower, &needle, &wanted_tags, query) {
            continue;
        }
        let excerpt = excerpt(&entry.body, &body_lower, &needle);
        hits.push(SearchHit {
            id: entry.id,
            date: entry.date,
            tags: entry.tags,
            summary: entry.summary,
            excerpt,
        });
    }

    hits.sort_by(|a, b| {
        b.date
            .as_deref()
            .unwrap_or("")
            .cmp(a.date.as_deref().unwrap_or(""))
    });
    Ok(hits)
}

fn matches(
    entry: &Entry,
    body_lower: &str,
    needle: &str,
    wanted_tags: &[String],
    query: &SearchQuery,
) -> bool {
    if !needle.is_empty()
        && !body_lower.contains(needle)
        && !entry.summary.to_lowercase().contains(needle)
    {
        return false;
    }

    if !wanted_tags.is_empty() {
        let entry_tags: Vec<String> = entry.tags.iter().map(|t| t.to_lowercase()).collect();
        if !wanted_tags.iter().all(|t| entry_tags.contains(t)) {
            return false;
        }
    }

    if query.date_from.is_some() || query.date_to.is_some() {
        // Dated bounds can only match dated entries.
        let Some(date) = entry.date.as_deref() else {
            return false;
        };
        if let Some(from) = query.date_from.as_deref() {
            if date < from {
                return false;
            }
        }
        if let Some(to) = query.date_to.as_deref() {
            if date > to {
                return false;
            }
        }
    }

    true
}

/// A bounded window of body text around the first query match, or the start
/// of the body for an empty query. Clipped edges are marked with `...`.
fn excerpt(body: &str, body_lower: &str, needle: &str) -> String {
    let match_at = if needle.is_empty() {
        0
    } else {
        body_lower.find(needle).unwrap_or(0)
    };

    let start = floor_char_boundary(body, match_at.saturating_sub(EXCERPT_LEAD));
    let end = floor_char_boundary(body, (start + EXCERPT_WINDOW).min(body.len()));

    let mut window = body[start..end].replace('\n', " ").trim().to_string();
    if start > 0 {
        window.insert_str(0, "...");
    }
    if end < body.len() {
        window.push_str("...");
    }
    window
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
