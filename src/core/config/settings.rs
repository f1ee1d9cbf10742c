//! Typed view of the merged configuration.
//!
//! Every section has serde defaults, so an empty `config.yml` yields a
//! usable (if unconnected) configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub azure: AzureConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub diff: DiffConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_allowed_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub max_connections: u32,
    /// JSON file of passages loaded by the in-memory backend.
    pub seed_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            user: "postgres".to_string(),
            password: None,
            max_connections: 5,
            seed_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com/`.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub api_version: String,
    pub embedding_deployment: String,
    pub embedding_api_version: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            api_version: DEFAULT_CHAT_API_VERSION.to_string(),
            embedding_deployment: "text-embedding-3-small".to_string(),
            embedding_api_version: DEFAULT_EMBEDDING_API_VERSION.to_string(),
            request_timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl AzureConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub default_model: String,
    pub suggestion_model: String,
    pub judge_model: String,
    /// Model id → Azure deployment name.
    pub models: BTreeMap<String, String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_CHAT_MODEL.to_string(),
            suggestion_model: DEFAULT_SUGGESTION_MODEL.to_string(),
            judge_model: DEFAULT_JUDGE_MODEL.to_string(),
            models: default_model_deployments(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Prefix used when composing a collection name from product and version.
    pub namespace: String,
    pub top_k: usize,
    /// Results at or below this similarity are discarded.
    pub min_similarity: f64,
    /// Added to (or overriding) the built-in abbreviation table.
    pub abbreviations: BTreeMap<String, String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            abbreviations: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Chunks whose best cross-version match is at or above this are dropped.
    pub similarity_threshold: f32,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_UNIQUENESS_THRESHOLD,
        }
    }
}
