//! Journaling web service with an LLM chat companion.
//!
//! A user posts free-text messages; the backend asks a language model for a
//! reflective reply and persists the exchange in a dated markdown document
//! with YAML frontmatter. The REST surface lists, fetches, and searches past
//! entries; a background worker snapshots the journal directory to git.
//!
//! # Architecture
//!
//! - **Storage**: one markdown file per calendar day in a flat directory,
//!   frontmatter metadata merged additively on every append
//! - **Companion**: ordered backend chain (local Ollama, then an
//!   OpenAI-compatible API) degrading to a fixed placeholder reply
//! - **Search**: per-request scan with query, tag, and date-range filters
//! - **Transport**: REST over axum
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`companion`] — LLM backend chain: reflective replies, tag and weather suggestions
//! - [`journal`] — Core journal engine: frontmatter codec, entry store, search
//! - [`server`] — HTTP routes over the store
//! - [`versioning`] — Best-effort git snapshots of the journal directory

pub mod companion;
pub mod config;
pub mod journal;
pub mod server;
pub mod versioning;
