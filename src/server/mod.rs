// SPDX-License-Identifier: MIT

//! HTTP surface for the decision engine
//!
//! Guidelines are either sent inline or looked up by id in the configured
//! guidelines directory.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::engine::{summarize_inputs, DecisionEngine, PatientInputs};
use crate::error::GuidelineError;
use crate::guideline::{validate, GuidelineDocument, GuidelineLoader};

type ApiResponse = (StatusCode, Json<Value>);

/// Shared state for all handlers
pub struct AppState {
    pub settings: Settings,
}

pub fn router(settings: Settings) -> Router {
    let state = Arc::new(AppState { settings });
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/guidelines", get(list_guidelines))
        .route("/api/guidelines/{id}", get(get_guideline))
        .route("/api/evaluate", post(evaluate_guideline))
        .route("/api/summarize", post(summarize))
        .route("/api/validate", post(validate_guideline))
        .route("/api/explain", post(explain_path))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(settings: Settings) -> Result<(), GuidelineError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], settings.port));
    let app = router(settings);
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Guideline reference shared by every POST body
#[derive(Debug, Deserialize)]
pub struct GuidelineRef {
    pub guideline_id: Option<String>,
    pub guideline: Option<GuidelineDocument>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(flatten)]
    pub target: GuidelineRef,
    #[serde(default)]
    pub inputs: PatientInputs,
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    #[serde(flatten)]
    pub target: GuidelineRef,
    pub path: Vec<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (status, Json(json!({ "error": message.into() })))
}

async fn resolve(
    state: &AppState,
    target: GuidelineRef,
) -> Result<GuidelineDocument, ApiResponse> {
    if let Some(doc) = target.guideline {
        return Ok(doc);
    }
    let Some(id) = target.guideline_id else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "either guideline or guideline_id is required",
        ));
    };

    let dir = state.settings.guidelines_dir.clone();
    let lookup_id = id.clone();
    let found = tokio::task::spawn_blocking(move || {
        GuidelineLoader::new().find_in_dir(dir, &lookup_id)
    })
    .await
    .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    found.map_err(|e| match e {
        GuidelineError::NotFound { .. } => {
            log::warn!("{}", e);
            error_response(StatusCode::NOT_FOUND, e.to_string())
        }
        other => {
            log::error!("Failed to read guidelines for '{}': {}", id, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    })
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_guidelines(State(state): State<Arc<AppState>>) -> ApiResponse {
    let dir: PathBuf = state.settings.guidelines_dir.clone();
    let loaded = tokio::task::spawn_blocking(move || GuidelineLoader::new().load_dir(dir)).await;

    match loaded {
        Ok(Ok(docs)) => {
            let listing: Vec<Value> = docs
                .iter()
                .map(|(path, doc)| {
                    json!({
                        "id": doc.id(),
                        "name": doc.name(),
                        "format": doc.format(),
                        "file": path.to_string_lossy(),
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!(listing)))
        }
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn get_guideline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResponse {
    let target = GuidelineRef {
        guideline_id: Some(id),
        guideline: None,
    };
    match resolve(&state, target).await {
        Ok(doc) => (StatusCode::OK, Json(json!(doc))),
        Err(resp) => resp,
    }
}

async fn evaluate_guideline(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> ApiResponse {
    let doc = match resolve(&state, payload.target).await {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    let Some(guideline) = doc.as_legacy() else {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "graph/rules guidelines cannot be evaluated by the engine",
        );
    };

    let engine = DecisionEngine::with_options(guideline, state.settings.engine_options());
    match engine.evaluate(&payload.inputs) {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "result": result,
                "summary": summarize_inputs(guideline, &payload.inputs),
            })),
        ),
        Err(e) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Unable to reach a recommendation: {}", e),
        ),
    }
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> ApiResponse {
    let doc = match resolve(&state, payload.target).await {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    match doc.as_legacy() {
        Some(guideline) => (
            StatusCode::OK,
            Json(json!({ "summary": summarize_inputs(guideline, &payload.inputs) })),
        ),
        None => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "graph/rules guidelines declare no inputs",
        ),
    }
}

async fn validate_guideline(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GuidelineRef>,
) -> ApiResponse {
    let doc = match resolve(&state, payload).await {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    match &doc {
        GuidelineDocument::Legacy(guideline) => {
            let report = validate(guideline);
            let messages: Vec<String> = report.issues.iter().map(|i| i.to_string()).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "valid": report.is_valid(),
                    "issues": report.issues,
                    "messages": messages,
                })),
            )
        }
        GuidelineDocument::Nice(guideline) => {
            let dangling = guideline.dangling_edges();
            (
                StatusCode::OK,
                Json(json!({ "valid": dangling.is_empty(), "dangling_edges": dangling })),
            )
        }
    }
}

async fn explain_path(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExplainRequest>,
) -> ApiResponse {
    let doc = match resolve(&state, payload.target).await {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    match doc.as_nice() {
        Some(guideline) => (
            StatusCode::OK,
            Json(json!({ "steps": guideline.explain_path(&payload.path) })),
        ),
        None => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "path explanation needs a graph/rules guideline",
        ),
    }
}
