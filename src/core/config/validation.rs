use serde_json::{Map, Value};

use crate::core::errors::CoreError;

pub fn validate_config(config: &Value) -> Result<(), CoreError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(store) = expect_optional_object(root, "store")? {
        if let Some(backend) = store.get("backend") {
            match backend.as_str() {
                Some("postgres") | Some("memory") => {}
                Some(other) => {
                    return Err(CoreError::Validation(format!(
                        "Invalid config at 'store.backend': unknown backend '{}'",
                        other
                    )))
                }
                None => return Err(config_type_error("store.backend", "string")),
            }
        }
        validate_optional_string_field(store, "store.host", "host")?;
        validate_u64_field(store, "store.port", "port", 1, 65535)?;
        validate_optional_string_field(store, "store.database", "database")?;
        validate_optional_string_field(store, "store.user", "user")?;
        validate_u64_field(store, "store.max_connections", "max_connections", 1, 1_000)?;
        validate_optional_string_field(store, "store.seed_path", "seed_path")?;
    }

    if let Some(azure) = expect_optional_object(root, "azure")? {
        validate_optional_string_field(azure, "azure.endpoint", "endpoint")?;
        validate_optional_string_field(azure, "azure.api_version", "api_version")?;
        validate_optional_string_field(
            azure,
            "azure.embedding_deployment",
            "embedding_deployment",
        )?;
        validate_u64_field(
            azure,
            "azure.request_timeout_secs",
            "request_timeout_secs",
            1,
            3_600,
        )?;
        validate_u64_field(azure, "azure.max_retries", "max_retries", 1, 10)?;
    }

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_optional_string_field(llm, "llm.default_model", "default_model")?;
        validate_optional_string_field(llm, "llm.suggestion_model", "suggestion_model")?;
        validate_optional_string_field(llm, "llm.judge_model", "judge_model")?;
        validate_string_map_field(llm, "llm.models", "models")?;
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_optional_string_field(retrieval, "retrieval.namespace", "namespace")?;
        validate_u64_field(retrieval, "retrieval.top_k", "top_k", 1, 1_000)?;
        validate_f64_field(
            retrieval,
            "retrieval.min_similarity",
            "min_similarity",
            0.0,
            1.0,
        )?;
        validate_string_map_field(retrieval, "retrieval.abbreviations", "abbreviations")?;
    }

    if let Some(diff) = expect_optional_object(root, "diff")? {
        validate_f64_field(
            diff,
            "diff.similarity_threshold",
            "similarity_threshold",
            0.0,
            1.0,
        )?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, CoreError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), CoreError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(CoreError::Validation(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), CoreError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(CoreError::Validation(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), CoreError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() || value.as_str().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "string"))
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), CoreError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn validate_string_map_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), CoreError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(entries) = value.as_object() else {
        return Err(config_type_error(path, "map of strings"));
    };
    for (entry_key, entry_value) in entries {
        let entry_path = format!("{}.{}", path, entry_key);
        let Some(text) = entry_value.as_str() else {
            return Err(config_type_error(&entry_path, "string"));
        };
        if entry_key.trim().is_empty() || text.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Invalid config at '{}': value cannot be empty",
                entry_path
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> CoreError {
    CoreError::Validation(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_empty_and_well_formed_configs() {
        assert!(validate_config(&json!({})).is_ok());
        assert!(validate_config(&json!({
            "server": { "port": 5000, "cors_allowed_origins": ["*"] },
            "store": { "backend": "memory", "max_connections": 4 },
            "retrieval": { "min_similarity": 0.25, "abbreviations": { "GL": "General Ledger" } },
            "diff": { "similarity_threshold": 0.9 }
        }))
        .is_ok());
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let err = validate_config(&json!({ "retrieval": { "min_similarity": 1.5 } }))
            .unwrap_err();
        assert!(err.to_string().contains("retrieval.min_similarity"));

        let err = validate_config(&json!({ "diff": { "similarity_threshold": "high" } }))
            .unwrap_err();
        assert!(err.to_string().contains("expected number"));
    }

    #[test]
    fn rejects_unknown_store_backend() {
        let err = validate_config(&json!({ "store": { "backend": "chroma" } })).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("chroma"));
    }

    #[test]
    fn rejects_empty_model_deployment() {
        let err = validate_config(&json!({ "llm": { "models": { "azure/x": " " } } }))
            .unwrap_err();
        assert!(err.to_string().contains("llm.models.azure/x"));
    }
}
