use thiserror::Error;

use crate::core::errors::CoreError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] CoreError),

    #[error("Failed to initialize document store: {0}")]
    Store(#[source] CoreError),

    #[error("Failed to initialize Azure OpenAI client: {0}")]
    Llm(#[source] CoreError),
}
