//! HTTP server — the REST surface over the journal store.
//!
//! Routes: `GET /journal` (list), `GET /journal/{id}` (full entry),
//! `GET /journal/search` (filtered scan), `POST /chat` (append an exchange),
//! `GET /status` (companion backend reachability). Provider outages never
//! surface on `/chat`; storage failures map to 500 with a generic body.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::companion::CompanionChain;
use crate::config::DaybookConfig;
use crate::journal::search::{self, SearchHit, SearchQuery};
use crate::journal::store::JournalStore;
use crate::journal::types::{Entry, EntrySummary, ExchangeReceipt, JournalError};
use crate::versioning::VersioningSink;

pub struct AppState {
    pub store: JournalStore,
    pub companion: CompanionChain,
    pub sink: VersioningSink,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

fn internal_error(err: impl std::fmt::Display, public_message: &str) -> HandlerError {
    error!("{err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: public_message.to_string(),
        }),
    )
}

fn bad_request(message: &str) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/journal", get(list_journal))
        .route("/journal/search", get(search_journal))
        .route("/journal/{id}", get(get_entry))
        .route("/chat", post(chat))
        .route("/status", get(status))
        .with_state(state)
}

/// Run the server until ctrl-c.
pub async fn serve(config: DaybookConfig) -> Result<()> {
    let journal_dir = config.resolved_journal_dir();
    let store = JournalStore::new(journal_dir.clone());
    let companion = CompanionChain::from_config(&config.companion);
    let sink = if config.versioning.enabled {
        VersioningSink::spawn(journal_dir)
    } else {
        VersioningSink::disabled()
    };
    let state = Arc::new(AppState {
        store,
        companion,
        sink,
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "daybook listening at http://{bind_addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

// -- GET /journal --

async fn list_journal(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EntrySummary>>, HandlerError> {
    state
        .store
        .list_entries()
        .map(Json)
        .map_err(|err| internal_error(err, "Failed to list entries"))
}

// -- GET /journal/{id} --

async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Entry>, HandlerError> {
    match state.store.entry_by_id(&id) {
        Some(entry) => Ok(Json(entry)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "Not found".to_string(),
            }),
        )),
    }
}

// -- GET /journal/search --

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    /// Comma-separated tag list; every tag must match.
    tags: Option<String>,
    #[serde(rename = "dateFrom")]
    date_from: Option<String>,
    #[serde(rename = "dateTo")]
    date_to: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> SearchQuery {
        SearchQuery {
            query: self.q,
            tags: self
                .tags
                .map(|t| t.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

async fn search_journal(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, HandlerError> {
    search::search(&state.store, &params.into_query())
        .map(Json)
        .map_err(|err| internal_error(err, "Search failed"))
}

// -- POST /chat --

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ExchangeReceipt>, HandlerError> {
    if request.message.trim().is_empty() {
        return Err(bad_request("Empty message"));
    }
    state
        .store
        .append_exchange(&request.message, &state.companion, &state.sink)
        .await
        .map(Json)
        .map_err(|err| match err {
            JournalError::EmptyMessage => bad_request("Empty message"),
            other => internal_error(other, "Failed to process message"),
        })
}

// -- GET /status --

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend: Option<&'static str>,
    entries: usize,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let backend = state.companion.probe().await;
    let entries = state.store.list_entries().map(|e| e.len()).unwrap_or(0);
    Json(StatusResponse {
        status: if backend.is_some() {
            "online"
        } else {
            "offline"
        },
        backend,
        entries,
    })
}
