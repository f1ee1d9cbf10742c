pub mod azure;
pub mod provider;
pub mod types;

pub use azure::AzureOpenAiClient;
pub use provider::{CompletionGateway, EmbeddingGateway};
pub use types::ChatMessage;
