use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::chat::ChatRequest;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SuggestionRequest {
    pub query: String,
    pub context: Vec<String>,
    pub product: Option<String>,
    pub version: Option<String>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.chat.chat(payload).await?;
    Ok(Json(reply))
}

pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SuggestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let suggestions = state
        .chat
        .suggestions(
            &payload.query,
            &payload.context,
            payload.product.as_deref(),
            payload.version.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "suggestions": suggestions })))
}
