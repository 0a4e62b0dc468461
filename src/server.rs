//! Ingestion HTTP server.
//!
//! Exposes the pipeline entry points as a JSON HTTP API so an analysis
//! service can request ingestions without linking the crate.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/ingest/github` | `{ "repo_url": "...", "token": "..." }` |
//! | `POST` | `/ingest/archive` | Raw ZIP body (up to 50 MiB) |
//! | `POST` | `/ingest/files` | `{ "files": [{ "path": "...", "content": "..." }] }` |
//!
//! Successful ingestions return the [`Ingestion`] JSON with an extra
//! `context` field holding the rendered markdown bundle.
//!
//! `/ingest/github` only authenticates with the token in the request body.
//! The server's own `GITHUB_TOKEN` is used only when
//! `[server].use_env_token` is set.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "invalid GitHub URL: ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `no_files` (422), `upstream` (502),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::IntakeError;
use crate::models::{Ingestion, SuppliedFile};
use crate::pipeline::{ingest_archive, ingest_github, ingest_supplied, resolve_token};
use crate::render::render_context;

/// Largest accepted archive upload.
pub const MAX_ARCHIVE_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Starts the ingestion server on `[server].bind`.
///
/// Runs until the process is terminated. Returns an error if binding fails.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "ingestion server listening");

    axum::serve(listener, build_router(config.clone())).await?;
    Ok(())
}

/// Builds the router with all routes, CORS, and the upload limit applied.
pub fn build_router(config: Config) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/ingest/github", post(handle_github))
        .route("/ingest/archive", post(handle_archive))
        .route("/ingest/files", post(handle_files))
        .layer(DefaultBodyLimit::max(MAX_ARCHIVE_BYTES))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn no_files() -> AppError {
    AppError {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        code: "no_files",
        message: "no analyzable files found".to_string(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        let message = err.to_string();
        match err {
            IntakeError::InvalidRepoUrl(_) | IntakeError::Archive(_) => bad_request(message),
            IntakeError::Upstream { .. } | IntakeError::Http(_) | IntakeError::Decode(_) => {
                AppError {
                    status: StatusCode::BAD_GATEWAY,
                    code: "upstream",
                    message,
                }
            }
            IntakeError::Io(_) | IntakeError::Config(_) => internal(message),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Ingestion responses ============

#[derive(Serialize)]
struct IngestResponse {
    #[serde(flatten)]
    ingestion: Ingestion,
    context: String,
}

/// Empty results become `422 no_files`; anything else is returned with its
/// rendered context bundle.
fn respond(ingestion: Ingestion) -> Result<Json<IngestResponse>, AppError> {
    if ingestion.is_empty() {
        return Err(no_files());
    }
    let context = render_context(&ingestion);
    Ok(Json(IngestResponse { ingestion, context }))
}

// ============ POST /ingest/github ============

#[derive(Deserialize)]
struct GitHubRequest {
    repo_url: String,
    #[serde(default)]
    token: Option<String>,
}

async fn handle_github(
    State(state): State<AppState>,
    payload: Result<Json<GitHubRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;

    let token = if state.config.server.use_env_token {
        resolve_token(req.token)
    } else {
        req.token
    };

    let ingestion = ingest_github(&state.config, &req.repo_url, token)
        .await
        .inspect_err(|e| {
            warn!(repo_url = %req.repo_url, error = %e, "github ingestion failed");
        })?;

    respond(ingestion)
}

// ============ POST /ingest/archive ============

async fn handle_archive(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestResponse>, AppError> {
    if body.is_empty() {
        return Err(bad_request("request body must contain a ZIP archive"));
    }

    // ZIP inflation is CPU-bound; keep it off the async workers.
    let config = state.config.clone();
    let ingestion = tokio::task::spawn_blocking(move || ingest_archive(&config, &body))
        .await
        .map_err(|e| internal(format!("archive task failed: {}", e)))??;

    respond(ingestion)
}

// ============ POST /ingest/files ============

#[derive(Deserialize)]
struct FilesRequest {
    files: Vec<SuppliedFile>,
}

async fn handle_files(
    State(state): State<AppState>,
    payload: Result<Json<FilesRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;
    if req.files.is_empty() {
        return Err(bad_request("files must not be empty"));
    }

    respond(ingest_supplied(&state.config, req.files))
}
