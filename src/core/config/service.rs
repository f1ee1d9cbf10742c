use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::settings::AppConfig;
use super::validation::validate_config;
use crate::core::errors::CoreError;

const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 8] = [
    "api_key",
    "secret",
    "password",
    "_token",
    "token_",
    "credential",
    "private_key",
    "access_key",
];

const SENSITIVE_WHITELIST: [&str; 2] = ["max_tokens", "tokens"];

/// Environment variables that override config values, with their target path
/// and whether the value is numeric.
const ENV_OVERRIDES: [(&str, &[&str], bool); 10] = [
    ("PORT", &["server", "port"], true),
    ("POSTGRES_HOST", &["store", "host"], false),
    ("POSTGRES_PORT", &["store", "port"], true),
    ("POSTGRES_DB", &["store", "database"], false),
    ("POSTGRES_USER", &["store", "user"], false),
    ("POSTGRES_PASSWORD", &["store", "password"], false),
    ("AZURE_OPENAI_ENDPOINT", &["azure", "endpoint"], false),
    ("AZURE_OPENAI_API_KEY", &["azure", "api_key"], false),
    ("AZURE_OPENAI_API_VERSION", &["azure", "api_version"], false),
    (
        "AZURE_OPENAI_EMBEDDING_DEPLOYMENT",
        &["azure", "embedding_deployment"],
        false,
    ),
];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("DOCSAGE_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Public config deep-merged with secrets, then environment overrides.
    pub fn load_value(&self) -> Value {
        let public_config = load_yaml_file(&self.config_path());
        let secrets_config = load_yaml_file(&self.secrets_path());
        let mut merged = deep_merge(&public_config, &secrets_config);
        apply_env_overrides(&mut merged, |key| env::var(key).ok());
        merged
    }

    pub fn load(&self) -> Result<AppConfig, CoreError> {
        let value = self.load_value();
        parse_config(value)
    }

    pub fn redact_sensitive_values(&self, value: &Value) -> Value {
        redact_sensitive_values(value)
    }
}

pub fn parse_config(value: Value) -> Result<AppConfig, CoreError> {
    validate_config(&value)?;
    serde_json::from_value(value)
        .map_err(|e| CoreError::Validation(format!("Invalid config: {}", e)))
}

fn load_yaml_file(path: &Path) -> Value {
    if !path.exists() {
        return Value::Object(Map::new());
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Value>(&contents) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => Value::Object(Map::new()),
            Err(err) => {
                tracing::warn!("Ignoring unparsable config file {}: {}", path.display(), err);
                Value::Object(Map::new())
            }
        },
        Err(_) => Value::Object(Map::new()),
    }
}

fn apply_env_overrides<F>(config: &mut Value, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (var, path, numeric) in ENV_OVERRIDES {
        let Some(raw) = lookup(var) else {
            continue;
        };
        let value = if numeric {
            match raw.trim().parse::<u64>() {
                Ok(number) => Value::from(number),
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric {}={}", var, raw);
                    continue;
                }
            }
        } else {
            Value::String(raw)
        };
        ensure_object_path(config, path, value);
    }
}

fn ensure_object_path(config: &mut Value, path: &[&str], value: Value) {
    if path.is_empty() {
        return;
    }

    let mut current = config;
    for (index, key) in path.iter().enumerate() {
        if index == path.len() - 1 {
            if let Some(map) = current.as_object_mut() {
                map.insert(key.to_string(), value);
            }
            return;
        }

        if !current.get(*key).map(|v| v.is_object()).unwrap_or(false) {
            let Some(map) = current.as_object_mut() else {
                return;
            };
            map.insert((*key).to_string(), Value::Object(Map::new()));
        }

        let Some(next) = current.get_mut(*key) else {
            return;
        };
        current = next;
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    redacted.insert(key.clone(), Value::String(REDACT_PLACEHOLDER.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_values(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST
        .iter()
        .any(|allowed| *allowed == key_lower)
    {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn deep_merge_merges_objects_and_overrides_scalars() {
        let base = json!({
            "store": { "host": "db", "port": 5432 },
            "retrieval": { "top_k": 20 }
        });
        let secrets = json!({
            "store": { "password": "hunter2" },
            "retrieval": { "top_k": 8 }
        });

        let merged = deep_merge(&base, &secrets);

        assert_eq!(
            merged,
            json!({
                "store": { "host": "db", "port": 5432, "password": "hunter2" },
                "retrieval": { "top_k": 8 }
            })
        );
    }

    #[test]
    fn env_overrides_create_missing_sections() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("POSTGRES_HOST", "pg.internal"),
            ("POSTGRES_PORT", "6543"),
            ("AZURE_OPENAI_API_KEY", "key-123"),
            ("PORT", "not-a-number"),
        ]);
        let mut config = json!({ "store": { "database": "docs" } });

        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config["store"]["host"], "pg.internal");
        assert_eq!(config["store"]["port"], 6543);
        assert_eq!(config["store"]["database"], "docs");
        assert_eq!(config["azure"]["api_key"], "key-123");
        assert!(config.get("server").is_none());
    }

    #[test]
    fn redact_sensitive_values_replaces_secrets_only() {
        let input = json!({
            "azure": { "api_key": "secret", "max_retries": 3 },
            "store": { "password": "pw", "user": "docs" }
        });

        let redacted = redact_sensitive_values(&input);

        assert_eq!(
            redacted,
            json!({
                "azure": { "api_key": "****", "max_retries": 3 },
                "store": { "password": "****", "user": "docs" }
            })
        );
    }

    #[test]
    fn loads_yaml_and_secrets_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.yml"),
            "retrieval:\n  top_k: 7\nstore:\n  backend: memory\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("secrets.yaml"), "azure:\n  api_key: abc\n").unwrap();

        let paths = AppPaths::from_dirs(dir.path().to_path_buf(), dir.path().to_path_buf());
        let service = ConfigService::new(Arc::new(paths));
        let value = deep_merge(
            &load_yaml_file(&service.config_path()),
            &load_yaml_file(&service.secrets_path()),
        );
        let config = parse_config(value).unwrap();

        assert_eq!(config.retrieval.top_k, 7);
        assert_eq!(config.azure.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn invalid_values_fail_parsing() {
        let err = parse_config(json!({ "retrieval": { "top_k": 0 } })).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
