//! Chunk-level semantic diff between answers for different versions.

pub mod segmenter;
pub mod uniqueness;

pub use segmenter::{normalize_text, split_into_chunks, split_into_sentences};
pub use uniqueness::{is_unique, SemanticDiffer, UniqueChunk, VersionHighlights};
