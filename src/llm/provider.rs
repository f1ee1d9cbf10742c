use async_trait::async_trait;

use crate::core::errors::CoreError;

/// Turns text into fixed-length vectors.
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// One vector per input, in input order. A single call covers the whole
    /// batch.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, CoreError>;
}

/// Prompt-to-text completion against a named model.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CoreError>;
}
