use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::chat::ChatService;
use crate::core::config::{AppConfig, AppPaths, ConfigService, StoreBackend};
use crate::diff::SemanticDiffer;
use crate::llm::{AzureOpenAiClient, CompletionGateway, EmbeddingGateway};
use crate::rag::{DocumentStore, InMemoryStore, PassageRetriever, PgVectorStore};

pub mod error;

use error::InitializationError;

/// Shared state handed to every route.
///
/// Holds the loaded configuration plus the services built from it:
/// - the document store (Postgres or in-memory)
/// - the passage retriever and chat orchestrator
/// - the cross-version semantic differ
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub retriever: Arc<PassageRetriever>,
    pub chat: Arc<ChatService>,
    pub differ: Arc<SemanticDiffer>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Loads configuration and wires the services.
    ///
    /// The Postgres pool connects lazily, so an unreachable database shows
    /// up as failing requests rather than a failed start.
    pub async fn initialize(
        paths: Arc<AppPaths>,
        config: ConfigService,
    ) -> Result<Arc<Self>, InitializationError> {
        let settings = config.load().map_err(InitializationError::Config)?;

        let azure = Arc::new(
            AzureOpenAiClient::new(&settings.azure, &settings.llm)
                .map_err(InitializationError::Llm)?,
        );

        let store: Arc<dyn DocumentStore> = match settings.store.backend {
            StoreBackend::Postgres => Arc::new(PgVectorStore::connect(&settings.store)),
            StoreBackend::Memory => match &settings.store.seed_path {
                Some(path) => Arc::new(
                    InMemoryStore::from_seed_file(path).map_err(InitializationError::Store)?,
                ),
                None => {
                    tracing::info!("Document store: empty in-memory store");
                    Arc::new(InMemoryStore::new())
                }
            },
        };

        Ok(Self::from_parts(
            paths,
            config,
            settings,
            store,
            azure.clone(),
            azure,
        ))
    }

    /// Builds state around explicit collaborators.
    pub fn from_parts(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: AppConfig,
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingGateway>,
        completion: Arc<dyn CompletionGateway>,
    ) -> Arc<Self> {
        let retriever = Arc::new(PassageRetriever::new(
            store.clone(),
            embedder.clone(),
            settings.retrieval.clone(),
        ));
        let chat = Arc::new(ChatService::new(
            retriever.clone(),
            completion,
            settings.llm.clone(),
        ));
        let differ = Arc::new(SemanticDiffer::new(embedder, settings.diff.clone()));

        Arc::new(AppState {
            paths,
            config,
            settings: Arc::new(settings),
            store,
            retriever,
            chat,
            differ,
            started_at: Utc::now(),
        })
    }
}
