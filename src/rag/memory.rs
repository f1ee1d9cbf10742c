//! In-process document store with brute-force cosine search.
//!
//! Backs tests and offline runs; can be seeded from a JSON file of
//! `{ "document", "collection_name", "embedding" }` records.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::store::{DocumentStore, Passage, StoreHit};
use crate::core::errors::CoreError;
use crate::vector_math::cosine_similarity;

#[derive(Debug, Clone, Deserialize)]
pub struct StoredPassage {
    pub document: String,
    pub collection_name: String,
    pub embedding: Vec<f32>,
}

#[derive(Default)]
pub struct InMemoryStore {
    passages: RwLock<Vec<StoredPassage>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_passages(passages: Vec<StoredPassage>) -> Self {
        Self {
            passages: RwLock::new(passages),
        }
    }

    pub fn from_seed_file(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Store(format!("{}: {}", path.display(), e)))?;
        let passages: Vec<StoredPassage> = serde_json::from_str(&contents)
            .map_err(|e| CoreError::Store(format!("{}: {}", path.display(), e)))?;
        tracing::info!(
            "Loaded {} passages into the in-memory store from {}",
            passages.len(),
            path.display()
        );
        Ok(Self::with_passages(passages))
    }

    pub async fn insert(
        &self,
        collection_name: impl Into<String>,
        document: impl Into<String>,
        embedding: Vec<f32>,
    ) {
        self.passages.write().await.push(StoredPassage {
            document: document.into(),
            collection_name: collection_name.into(),
            embedding,
        });
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn nearest(
        &self,
        embedding: &[f32],
        collection: Option<&str>,
        limit: usize,
    ) -> Result<Vec<StoreHit>, CoreError> {
        let passages = self.passages.read().await;

        let mut hits: Vec<StoreHit> = passages
            .iter()
            .filter(|p| collection.map_or(true, |name| p.collection_name == name))
            .map(|p| StoreHit {
                document: p.document.clone(),
                collection_name: p.collection_name.clone(),
                distance: 1.0 - f64::from(cosine_similarity(embedding, &p.embedding)),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn list_collections(&self) -> Result<Vec<String>, CoreError> {
        let passages = self.passages.read().await;
        let mut names: Vec<String> = passages.iter().map(|p| p.collection_name.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn sample_collection(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Passage>, CoreError> {
        let passages = self.passages.read().await;
        Ok(passages
            .iter()
            .filter(|p| p.collection_name == collection)
            .take(limit)
            .map(|p| Passage {
                document: p.document.clone(),
                collection_name: p.collection_name.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert("temenos_transact_r23", "fees r23", vec![1.0, 0.0]).await;
        store.insert("temenos_transact_r22", "fees r22", vec![0.9, 0.1]).await;
        store.insert("temenos_transact_r23", "limits r23", vec![0.0, 1.0]).await;
        store
    }

    #[tokio::test]
    async fn nearest_orders_by_ascending_distance() {
        let store = seeded().await;
        let hits = store.nearest(&[1.0, 0.0], None, 10).await.unwrap();

        let docs: Vec<&str> = hits.iter().map(|h| h.document.as_str()).collect();
        assert_eq!(docs, vec!["fees r23", "fees r22", "limits r23"]);
        assert!(hits[0].distance.abs() < 1e-6);
        assert!((hits[2].distance - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn nearest_respects_collection_and_limit() {
        let store = seeded().await;
        let hits = store
            .nearest(&[1.0, 0.0], Some("temenos_transact_r23"), 1)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document, "fees r23");
    }

    #[tokio::test]
    async fn lists_and_samples_collections() {
        let store = seeded().await;
        assert_eq!(
            store.list_collections().await.unwrap(),
            vec!["temenos_transact_r22", "temenos_transact_r23"]
        );

        let sample = store
            .sample_collection("temenos_transact_r23", 10)
            .await
            .unwrap();
        assert_eq!(sample.len(), 2);
        assert!(store.sample_collection("missing", 10).await.unwrap().is_empty());
    }

    #[test]
    fn seed_file_errors_are_store_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            InMemoryStore::from_seed_file(&path),
            Err(CoreError::Store(_))
        ));

        std::fs::write(
            &path,
            r#"[{"document": "d", "collection_name": "temenos_x_r1", "embedding": [1.0]}]"#,
        )
        .unwrap();
        assert!(InMemoryStore::from_seed_file(&path).is_ok());
    }
}
