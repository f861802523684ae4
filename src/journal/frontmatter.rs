//! Frontmatter codec — YAML metadata block plus free-text body.
//!
//! A journal document is a markdown file that may begin with a `---`-delimited
//! YAML mapping. [`decode`] splits a raw document into `(metadata, body)` and
//! [`encode`] reassembles it. Both are pure; all I/O lives in the store.

use std::collections::BTreeMap;

use serde_yaml::Value;

/// Frontmatter metadata: string keys to YAML scalars or lists.
///
/// Unrecognized keys are carried through append operations untouched, so this
/// stays a generic mapping rather than a fixed struct.
pub type Metadata = BTreeMap<String, Value>;

const OPEN: &str = "---\n";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A `---` opener with no closing delimiter line.
    #[error("unterminated frontmatter block")]
    Unterminated,
    /// The block is present but is not valid YAML, or not a mapping.
    #[error("invalid frontmatter: {0}")]
    Yaml(String),
}

/// Split a raw document into its metadata mapping and body.
///
/// A document with no leading `---` line has no frontmatter: the whole text is
/// returned as the body with an empty mapping. A block that is present but
/// malformed is an error — callers decide whether to skip or rescue.
pub fn decode(raw: &str) -> Result<(Metadata, String), ParseError> {
    let Some(rest) = raw.strip_prefix(OPEN) else {
        return Ok((Metadata::new(), raw.to_string()));
    };

    let (yaml_src, body) = split_block(rest).ok_or(ParseError::Unterminated)?;

    if yaml_src.trim().is_empty() {
        return Ok((Metadata::new(), body.to_string()));
    }

    let mut metadata: Metadata =
        serde_yaml::from_str(yaml_src).map_err(|err| ParseError::Yaml(err.to_string()))?;
    normalize_date(&mut metadata);

    Ok((metadata, body.to_string()))
}

/// Reassemble a document from body and metadata.
///
/// An empty mapping produces the bare body, so `decode(encode(b, m)) == (m, b)`
/// holds in both directions for any body that does not itself start with the
/// delimiter sequence.
pub fn encode(body: &str, metadata: &Metadata) -> String {
    if metadata.is_empty() {
        return body.to_string();
    }
    let yaml = serde_yaml::to_string(metadata)
        .expect("string-keyed YAML mapping always serializes");
    format!("---\n{yaml}---\n{body}")
}

/// Locate the closing `---` line. Returns `(yaml_source, body)`.
fn split_block(rest: &str) -> Option<(&str, &str)> {
    // Empty block: the opener is immediately followed by the closer.
    if let Some(body) = rest.strip_prefix("---\n") {
        return Some(("", body));
    }
    if rest == "---" {
        return Some(("", ""));
    }

    let mut from = 0;
    while let Some(pos) = rest[from..].find("\n---") {
        let at = from + pos;
        let after = at + 4;
        if after == rest.len() {
            return Some((&rest[..at + 1], ""));
        }
        if rest.as_bytes()[after] == b'\n' {
            return Some((&rest[..at + 1], &rest[after + 1..]));
        }
        from = at + 1;
    }
    None
}

/// Re-stringify a timestamp-valued `date` field to a plain `YYYY-MM-DD`.
///
/// Documents written by other frontmatter tooling can carry a full ISO
/// timestamp in `date` (YAML date scalars round-tripped through a native date
/// type). Downstream sorting and range filters compare dates as strings, so
/// the codec flattens those back to the calendar date.
fn normalize_date(metadata: &mut Metadata) {
    let Some(Value::String(date)) = metadata.get("date") else {
        return;
    };
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(date) {
        let day = ts.date_naive().format("%Y-%m-%d").to_string();
        metadata.insert("date".to_string(), Value::String(day));
    }
}
