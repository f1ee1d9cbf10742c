use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag::{compose_collection_name, group_products, previous_version};
use crate::state::AppState;

const CONTEXT_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScopeRequest {
    pub product: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendVersionsRequest {
    pub product: String,
    pub version1: String,
}

/// Products and their versions, as found in the store's collection names.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let names = state.store.list_collections().await?;
    let products = group_products(&names);
    tracing::debug!(
        "{} collections grouped into {} products",
        names.len(),
        products.len()
    );
    Ok(Json(products))
}

/// A sample of passages from one product/version collection.
pub async fn get_context(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScopeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = payload.product.as_deref().map(str::trim).unwrap_or_default();
    let version = payload.version.as_deref().map(str::trim).unwrap_or_default();
    if product.is_empty() || version.is_empty() {
        return Err(ApiError::BadRequest("Product and version required".to_string()));
    }

    let collection = compose_collection_name(&state.settings.retrieval.namespace, product, version);
    let passages = state
        .store
        .sample_collection(&collection, CONTEXT_SAMPLE_SIZE)
        .await?;
    Ok(Json(passages))
}

/// Echoes the selected version with its two predecessors.
pub async fn send_versions(
    Json(payload): Json<SendVersionsRequest>,
) -> impl IntoResponse {
    let previous = previous_version(&payload.version1);
    let before_previous = previous.as_deref().and_then(previous_version);
    let versions = vec![Some(payload.version1.clone()), previous, before_previous];

    tracing::info!(
        "Version selection for {}: {:?}",
        if payload.product.is_empty() { "<unspecified>" } else { payload.product.as_str() },
        versions
    );
    Json(json!({ "received_versions": versions }))
}
