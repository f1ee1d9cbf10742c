use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::config::defaults::default_cors_origins;
use crate::server::handlers::{self, catalog, chat, compare, config, health};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// - CORS from `server.cors_allowed_origins`
/// - per-request tracing spans
/// - health and redacted config endpoints
/// - chat, suggestions, catalog, comparison and semantic diff endpoints
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_allowed_origins);
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .route("/health", get(health::health))
        .route("/api/config", get(config::get_config))
        .route("/api/chat", post(chat::chat))
        .route("/api/suggestions", post(chat::suggestions))
        .route("/api/products", get(catalog::list_products))
        .route("/api/context", post(catalog::get_context))
        .route("/api/send-versions", post(catalog::send_versions))
        .route("/api/compare", post(compare::compare_models))
        .route("/api/compare-version", post(compare::compare_versions))
        .route("/api/semantic-llm-diff", post(compare::semantic_diff))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors_layer)
        .layer(trace_layer)
}

fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let origins = resolve_allowed_origins(configured);

    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>(),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn resolve_allowed_origins(configured: &[String]) -> Vec<String> {
    let origins = configured
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect::<Vec<_>>();

    if origins.is_empty() {
        return default_cors_origins();
    }

    origins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_origin_list_falls_back_to_local_defaults() {
        let resolved = resolve_allowed_origins(&["  ".to_string()]);
        assert_eq!(resolved, default_cors_origins());
    }

    #[test]
    fn configured_origins_are_trimmed() {
        let resolved = resolve_allowed_origins(&[
            " http://localhost:3000 ".to_string(),
            "*".to_string(),
        ]);
        assert_eq!(resolved, vec!["http://localhost:3000", "*"]);
    }
}
