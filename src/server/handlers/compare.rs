use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::chat::CandidateKind;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompareModelsRequest {
    pub question: String,
    pub answers: Vec<String>,
    pub models: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompareVersionsRequest {
    pub question: String,
    pub answers: Vec<String>,
    pub versions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SemanticDiffRequest {
    pub versions: Vec<String>,
    pub answers: Vec<String>,
}

pub async fn compare_models(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CompareModelsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let best = state
        .chat
        .pick_best(
            &payload.question,
            &payload.models,
            &payload.answers,
            CandidateKind::Models,
        )
        .await?;
    Ok(Json(json!({ "best": best })))
}

pub async fn compare_versions(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CompareVersionsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let best = state
        .chat
        .pick_best(
            &payload.question,
            &payload.versions,
            &payload.answers,
            CandidateKind::Versions,
        )
        .await?;
    Ok(Json(json!({ "best": best })))
}

/// Per-version chunks with no close match in any other version's answer.
pub async fn semantic_diff(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SemanticDiffRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let highlights = state
        .differ
        .diff(&payload.versions, &payload.answers)
        .await?;
    Ok(Json(json!({ "highlights": highlights })))
}
