use std::collections::BTreeMap;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_NAMESPACE: &str = "temenos";
pub const DEFAULT_TOP_K: usize = 20;
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.3;
pub const DEFAULT_UNIQUENESS_THRESHOLD: f32 = 0.90;

pub const DEFAULT_CHAT_MODEL: &str = "azure/gpt-4.1-mini";
pub const DEFAULT_SUGGESTION_MODEL: &str = "azure/gpt-4.1-nano";
pub const DEFAULT_JUDGE_MODEL: &str = "azure/gpt-4.1-mini";

pub const DEFAULT_CHAT_API_VERSION: &str = "2025-01-01-preview";
pub const DEFAULT_EMBEDDING_API_VERSION: &str = "2024-02-15-preview";

/// Model identifiers accepted by the chat gateway, mapped to their Azure
/// deployment names.
pub fn default_model_deployments() -> BTreeMap<String, String> {
    [
        ("azure/gpt-4.1-mini", "gpt-4.1-mini"),
        ("azure/gpt-4o-mini", "gpt-4o-mini"),
        ("azure/gpt-4.1-nano", "gpt-4.1-nano"),
    ]
    .into_iter()
    .map(|(id, deployment)| (id.to_string(), deployment.to_string()))
    .collect()
}

pub fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}
