//! Similarity-ranked passage retrieval, optionally scoped to one
//! product/version collection.

use std::sync::Arc;

use serde::Serialize;

use super::abbreviations::AbbreviationExpander;
use super::collection::compose_collection_name;
use super::store::{DocumentStore, StoreHit};
use crate::core::config::RetrievalConfig;
use crate::core::errors::CoreError;
use crate::llm::EmbeddingGateway;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub document: String,
    pub collection_name: String,
    /// `1 - distance`, rounded to four decimals.
    pub similarity: f64,
}

pub struct PassageRetriever {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingGateway>,
    expander: AbbreviationExpander,
    config: RetrievalConfig,
}

impl PassageRetriever {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingGateway>,
        config: RetrievalConfig,
    ) -> Self {
        let expander = AbbreviationExpander::new(&config.abbreviations);
        Self {
            store,
            embedder,
            expander,
            config,
        }
    }

    pub fn default_top_k(&self) -> usize {
        self.config.top_k
    }

    /// The collection a product/version pair maps to, when both are present.
    pub fn scope_collection(&self, product: Option<&str>, version: Option<&str>) -> Option<String> {
        match (non_empty(product), non_empty(version)) {
            (Some(product), Some(version)) => Some(compose_collection_name(
                &self.config.namespace,
                product,
                version,
            )),
            _ => None,
        }
    }

    /// Top passages for `query`, best first, with weak matches removed.
    ///
    /// The query is expanded and embedded once; the search is restricted to
    /// the product/version collection only when both are given.
    pub async fn retrieve(
        &self,
        query: &str,
        product: Option<&str>,
        version: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>, CoreError> {
        let expanded = self.expander.expand(query);
        tracing::debug!("Expanded query: {}", expanded);

        let mut embeddings = self.embedder.embed(&[expanded]).await?;
        let query_embedding = embeddings
            .pop()
            .ok_or_else(|| CoreError::Embedding("no embedding returned for query".to_string()))?;

        let collection = self.scope_collection(product, version);
        let hits = self
            .store
            .nearest(&query_embedding, collection.as_deref(), top_k)
            .await?;

        let fetched = hits.len();
        let results = rank_hits(hits, self.config.min_similarity);
        tracing::info!(
            "Retrieved {} of {} passages (scope: {})",
            results.len(),
            fetched,
            collection.as_deref().unwrap_or("all collections")
        );

        Ok(results)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Converts distances to similarities and drops anything at or below
/// `min_similarity`. The sort is stable, so equal scores keep store order.
pub fn rank_hits(hits: Vec<StoreHit>, min_similarity: f64) -> Vec<RetrievalResult> {
    let mut results: Vec<RetrievalResult> = hits
        .into_iter()
        .map(|hit| RetrievalResult {
            similarity: round4(1.0 - hit.distance),
            document: hit.document,
            collection_name: hit.collection_name,
        })
        .filter(|result| result.similarity > min_similarity)
        .collect();

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}
