//! Dictionary HTTP API
//!
//! ## Endpoints
//! - `POST /dictionary/words` - insert a batch of words
//! - `GET /dictionary/words/search` - reverse lookup by description
//! - `GET /dictionary/words/:word` - definitions of a word
//! - `POST /dictionary/index` - rebuild the search index
//! - `GET /health` - Health check
//!
//! Failures are JSON `{"error": kind, "message": text}`.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::core::{
    with_deadline, DictionaryError, DictionaryService, FindWordsInput, GetWordDefinitionsInput,
};
use crate::database::{Cursor, InsertReport};
use crate::lexicon::{NewWordInput, PartOfSpeech};

#[derive(Clone)]
pub struct ApiState {
    pub service: DictionaryService,
    pub request_timeout: Duration,
    /// Deadline for a full index rebuild.
    pub index_timeout: Duration,
}

impl ApiState {
    pub fn new(service: DictionaryService, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
            index_timeout: Duration::from_secs(15 * 60),
        }
    }

    pub fn with_index_timeout(mut self, timeout: Duration) -> Self {
        self.index_timeout = timeout;
        self
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/dictionary/words", post(create_words))
        .route("/dictionary/words/search", get(find_matching_words))
        .route("/dictionary/words/:word", get(get_definition))
        .route("/dictionary/index", post(index_words))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

/// Serve the API on `addr` until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, state: ApiState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!(%addr, error = %e, "failed to bind dictionary API");
        e
    })?;

    info!(addr = %listener.local_addr()?, "dictionary API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("dictionary API shutting down");
        })
        .await
}

// ============================================================================
// Errors
// ============================================================================

pub struct ApiError(DictionaryError);

impl From<DictionaryError> for ApiError {
    fn from(e: DictionaryError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            DictionaryError::InputInvalid(_) => StatusCode::BAD_REQUEST,
            DictionaryError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "request failed");
        }

        (
            status,
            Json(serde_json::json!({
                "error": self.0.kind(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

fn invalid(message: impl ToString) -> ApiError {
    ApiError(DictionaryError::InputInvalid(vec![message.to_string()]))
}

fn parse_part_of_speech(raw: Option<&str>) -> Result<Option<PartOfSpeech>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(code) => code.parse::<PartOfSpeech>().map(Some).map_err(invalid),
        None => Ok(None),
    }
}

// ============================================================================
// HTTP Handlers
// ============================================================================

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Serialize)]
struct CreateWordsResponse {
    message: &'static str,
    #[serde(flatten)]
    report: InsertReport,
}

async fn create_words(
    State(state): State<ApiState>,
    Json(batch): Json<Vec<NewWordInput>>,
) -> Result<Json<CreateWordsResponse>, ApiError> {
    let report = with_deadline(
        "create words",
        state.request_timeout,
        state.service.create_words(&batch),
    )
    .await?;

    Ok(Json(CreateWordsResponse {
        message: "ok",
        report,
    }))
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    description: String,
    part_of_speech: Option<String>,
    cursor_id: Option<String>,
    #[serde(default)]
    include_explicit: bool,
}

async fn find_matching_words(
    State(state): State<ApiState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let cursor = match params.cursor_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<Cursor>().map_err(invalid)?),
        _ => None,
    };

    let input = FindWordsInput {
        description: params.description,
        part_of_speech: parse_part_of_speech(params.part_of_speech.as_deref())?,
        cursor,
        include_explicit: params.include_explicit,
    };

    let matches = with_deadline(
        "find matching words",
        state.request_timeout,
        state.service.find_matching_words(&input),
    )
    .await?;

    Ok(Json(matches).into_response())
}

#[derive(Debug, Default, Deserialize)]
struct DefinitionParams {
    part_of_speech: Option<String>,
    #[serde(default)]
    verbatim: bool,
}

async fn get_definition(
    State(state): State<ApiState>,
    Path(word): Path<String>,
    Query(params): Query<DefinitionParams>,
) -> Result<Response, ApiError> {
    let input = GetWordDefinitionsInput {
        word,
        part_of_speech: parse_part_of_speech(params.part_of_speech.as_deref())?,
        verbatim: params.verbatim,
    };

    let definitions = with_deadline(
        "get definition",
        state.request_timeout,
        state.service.get_definition(&input),
    )
    .await?;

    Ok(Json(definitions).into_response())
}

async fn index_words(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let indexed = with_deadline(
        "index words",
        state.index_timeout,
        state.service.index_words(),
    )
    .await?;
    Ok(Json(serde_json::json!({ "message": "ok", "indexed": indexed })).into_response())
}
