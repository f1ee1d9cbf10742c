//! Retrieval over the versioned documentation store.
//!
//! - `DocumentStore`: nearest-neighbour search and collection listing
//! - `PgVectorStore` / `InMemoryStore`: the two store backends
//! - `PassageRetriever`: query expansion, embedding and similarity ranking
//! - `collection`: naming scheme `<namespace>_<product>_<version>`

pub mod abbreviations;
pub mod collection;
pub mod memory;
pub mod pgvector;
pub mod retriever;
pub mod store;

pub use abbreviations::AbbreviationExpander;
pub use collection::{
    compose_collection_name, group_products, parse_collection_identifier, previous_version,
    CollectionScope,
};
pub use memory::{InMemoryStore, StoredPassage};
pub use pgvector::PgVectorStore;
pub use retriever::{PassageRetriever, RetrievalResult};
pub use store::{DocumentStore, Passage, StoreHit};
