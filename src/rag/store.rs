//! Read-only view of the passage store used by
//! retrieval and the catalog endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::CoreError;

/// A documentation passage as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub document: String,
    pub collection_name: String,
}

/// One nearest-neighbour hit, as reported by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHit {
    pub document: String,
    pub collection_name: String,
    /// Cosine distance in `[0, 2]`; smaller is closer.
    pub distance: f64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Nearest passages to `embedding`, ascending by distance, at most `limit`.
    /// `collection` restricts the search to one exact collection name.
    async fn nearest(
        &self,
        embedding: &[f32],
        collection: Option<&str>,
        limit: usize,
    ) -> Result<Vec<StoreHit>, CoreError>;

    /// Every collection name known to the store.
    async fn list_collections(&self) -> Result<Vec<String>, CoreError>;

    /// Up to `limit` passages of one collection, in storage order.
    async fn sample_collection(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Passage>, CoreError>;
}
