//! HTTP surface: `/analyze`, `/health`, `/model/reload`.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::model::{self, ModelStatus};
use crate::pipeline::{AnalyzeRequest, AnalyzeResponse, Analyzer, Message};

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub config: Arc<ServiceConfig>,
}

/// Build the router with CORS applied.
pub fn router(state: AppState) -> Router {
    let cors = build_cors(&state.config.cors_origins);
    Router::new()
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .route("/model/reload", post(reload_model))
        .layer(cors)
        .with_state(state)
}

// ── Analyze ─────────────────────────────────────────────────────────────

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    validate_batch(&request.messages)?;

    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", %request_id, messages = request.messages.len());
    let response = state
        .analyzer
        .analyze(&request.messages, &request.options)
        .instrument(span)
        .await;
    Ok(Json(response))
}

/// Reject batches whose message ids are not unique.
fn validate_batch(messages: &[Message]) -> Result<(), ApiError> {
    let mut seen = HashSet::with_capacity(messages.len());
    for message in messages {
        if !seen.insert(message.id.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "duplicate message id: {}",
                message.id
            )));
        }
    }
    Ok(())
}

// ── Health / model ──────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> Json<ModelStatus> {
    let status = state
        .analyzer
        .state()
        .status(&state.config.default_classes)
        .await;
    Json(status)
}

/// POST /model/reload
///
/// Re-reads the configured artifact. On failure the current model state is
/// left as it was.
async fn reload_model(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let path = &state.config.model_path;
    let loaded = model::load_artifact(path).await?;
    info!(path = %path.display(), "Reloading model from artifact");

    let model_state = state.analyzer.state();
    model_state.reload(loaded).await;
    Ok(Json(model_state.status(&state.config.default_classes).await))
}

// ── CORS ────────────────────────────────────────────────────────────────

fn build_cors(origins: &[HeaderValue]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins.to_vec())
    }
}
