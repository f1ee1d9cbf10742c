//! Azure OpenAI gateway: embeddings and chat completions over HTTPS.
//!
//! Both calls share one retry loop with exponential backoff; callers above
//! this layer never retry.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::{CompletionGateway, EmbeddingGateway};
use super::types::ChatMessage;
use crate::core::config::{AzureConfig, LlmConfig};
use crate::core::errors::CoreError;

#[derive(Clone)]
pub struct AzureOpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    embedding_deployment: String,
    embedding_api_version: String,
    max_retries: u32,
    deployments: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

impl AzureOpenAiClient {
    pub fn new(azure: &AzureConfig, llm: &LlmConfig) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(azure.request_timeout())
            .build()
            .map_err(CoreError::completion)?;

        let mut endpoint = azure.endpoint.trim().to_string();
        if !endpoint.is_empty() && !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        if endpoint.is_empty() {
            tracing::warn!("Azure endpoint is not configured; gateway calls will fail");
        }

        Ok(Self {
            client,
            endpoint,
            api_key: azure.api_key.clone().unwrap_or_default(),
            api_version: azure.api_version.clone(),
            embedding_deployment: azure.embedding_deployment.clone(),
            embedding_api_version: azure.embedding_api_version.clone(),
            max_retries: azure.max_retries.max(1),
            deployments: llm.models.clone(),
        })
    }

    fn embeddings_url(&self) -> String {
        format!(
            "{}openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.embedding_deployment, self.embedding_api_version
        )
    }

    fn chat_url(&self, model: &str) -> Option<String> {
        self.deployments.get(model).map(|deployment| {
            format!(
                "{}openai/deployments/{}/chat/completions?api-version={}",
                self.endpoint, deployment, self.api_version
            )
        })
    }

    async fn post_with_retry(&self, url: &str, body: &Value) -> Result<Value, String> {
        let mut last_error = String::new();

        for attempt in 0..self.max_retries {
            match self.post_once(url, body).await {
                Ok(payload) => return Ok(payload),
                Err(err) => {
                    last_error = err;
                    if attempt + 1 < self.max_retries {
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            "Azure request failed (attempt {}/{}), retrying in {:?}: {}",
                            attempt + 1,
                            self.max_retries,
                            delay,
                            last_error
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    async fn post_once(&self, url: &str, body: &Value) -> Result<Value, String> {
        let res = self
            .client
            .post(url)
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(format!("{}: {}", status, text));
        }

        res.json::<Value>().await.map_err(|e| e.to_string())
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6))
}

fn parse_embeddings(payload: Value, expected: usize) -> Result<Vec<Vec<f32>>, CoreError> {
    let response: EmbeddingResponse =
        serde_json::from_value(payload).map_err(CoreError::embedding)?;

    let mut items = response.data;
    if items.iter().all(|item| item.index.is_some()) {
        items.sort_by_key(|item| item.index);
    }

    if items.len() != expected {
        return Err(CoreError::Embedding(format!(
            "expected {} embeddings, received {}",
            expected,
            items.len()
        )));
    }

    Ok(items.into_iter().map(|item| item.embedding).collect())
}

fn parse_chat_content(payload: &Value) -> Result<String, CoreError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CoreError::Completion("response has no message content".to_string()))
}

#[async_trait]
impl EmbeddingGateway for AzureOpenAiClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({ "input": inputs });
        let payload = self
            .post_with_retry(&self.embeddings_url(), &body)
            .await
            .map_err(CoreError::Embedding)?;

        parse_embeddings(payload, inputs.len())
    }
}

#[async_trait]
impl CompletionGateway for AzureOpenAiClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CoreError> {
        let url = self
            .chat_url(model)
            .ok_or_else(|| CoreError::Completion(format!("unknown model: {}", model)))?;

        let body = json!({ "messages": [ChatMessage::user(prompt)] });
        let payload = self
            .post_with_retry(&url, &body)
            .await
            .map_err(CoreError::Completion)?;

        parse_chat_content(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> AzureOpenAiClient {
        let azure = AzureConfig {
            endpoint: endpoint.to_string(),
            embedding_deployment: "embed-small".to_string(),
            ..AzureConfig::default()
        };
        AzureOpenAiClient::new(&azure, &LlmConfig::default()).unwrap()
    }

    #[test]
    fn builds_deployment_urls() {
        let client = client("https://docs.openai.azure.com");
        assert_eq!(
            client.embeddings_url(),
            "https://docs.openai.azure.com/openai/deployments/embed-small/embeddings?api-version=2024-02-15-preview"
        );
        assert_eq!(
            client.chat_url("azure/gpt-4.1-nano").unwrap(),
            "https://docs.openai.azure.com/openai/deployments/gpt-4.1-nano/chat/completions?api-version=2025-01-01-preview"
        );
        assert!(client.chat_url("gpt-unknown").is_none());
    }

    #[tokio::test]
    async fn unknown_model_is_a_completion_error() {
        let client = client("https://docs.openai.azure.com/");
        let err = client.complete("hi", "local/llama").await.unwrap_err();
        assert!(matches!(err, CoreError::Completion(msg) if msg.contains("local/llama")));
    }

    #[test]
    fn embeddings_are_reordered_by_index() {
        let payload = json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let vectors = parse_embeddings(payload, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn embedding_count_mismatch_is_rejected() {
        let payload = json!({ "data": [ { "embedding": [1.0] } ] });
        let err = parse_embeddings(payload, 2).unwrap_err();
        assert!(matches!(err, CoreError::Embedding(_)));
    }

    #[test]
    fn chat_content_is_extracted() {
        let payload = json!({ "choices": [ { "message": { "role": "assistant", "content": "r23" } } ] });
        assert_eq!(parse_chat_content(&payload).unwrap(), "r23");
        assert!(parse_chat_content(&json!({ "choices": [] })).is_err());
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
    }
}
