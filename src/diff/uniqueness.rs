//! Cross-version uniqueness: which parts of each answer have no close
//! counterpart in any other version's answer.

use std::sync::Arc;

use serde::Serialize;

use super::segmenter::{normalize_text, split_into_chunks};
use crate::core::config::DiffConfig;
use crate::core::errors::CoreError;
use crate::llm::EmbeddingGateway;
use crate::vector_math::max_similarity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueChunk {
    pub text: String,
    pub is_unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionHighlights {
    pub version: String,
    pub chunks: Vec<UniqueChunk>,
}

/// A chunk is unique when its best cross-version match stays strictly below
/// the threshold.
pub fn is_unique(max_similarity: f32, threshold: f32) -> bool {
    max_similarity < threshold
}

pub struct SemanticDiffer {
    embedder: Arc<dyn EmbeddingGateway>,
    config: DiffConfig,
}

impl SemanticDiffer {
    pub fn new(embedder: Arc<dyn EmbeddingGateway>, config: DiffConfig) -> Self {
        Self { embedder, config }
    }

    /// Unique chunks per version, in input order.
    ///
    /// All chunks of all answers go through a single embedding call; each
    /// chunk is then scored against every chunk of the other versions.
    pub async fn diff(
        &self,
        versions: &[String],
        answers: &[String],
    ) -> Result<Vec<VersionHighlights>, CoreError> {
        if versions.is_empty() || answers.is_empty() {
            return Err(CoreError::Validation(
                "Missing 'versions' or 'answers' in request".to_string(),
            ));
        }
        if versions.len() != answers.len() {
            return Err(CoreError::Validation(
                "Version and answer lengths mismatch".to_string(),
            ));
        }

        let chunks_per_version: Vec<Vec<String>> =
            answers.iter().map(|answer| split_into_chunks(answer)).collect();

        let normalized: Vec<String> = chunks_per_version
            .iter()
            .flatten()
            .map(|chunk| normalize_text(chunk))
            .collect();
        tracing::info!(
            "Semantic diff over {} versions, {} chunks",
            versions.len(),
            normalized.len()
        );

        let embeddings = if normalized.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed(&normalized).await?
        };
        if embeddings.len() != normalized.len() {
            return Err(CoreError::Embedding(format!(
                "expected {} embeddings, got {}",
                normalized.len(),
                embeddings.len()
            )));
        }

        let mut embeddings_per_version: Vec<&[Vec<f32>]> =
            Vec::with_capacity(chunks_per_version.len());
        let mut offset = 0;
        for chunks in &chunks_per_version {
            embeddings_per_version.push(&embeddings[offset..offset + chunks.len()]);
            offset += chunks.len();
        }

        let threshold = self.config.similarity_threshold;
        let highlights = versions
            .iter()
            .zip(&chunks_per_version)
            .enumerate()
            .map(|(idx, (version, chunks))| {
                let own = embeddings_per_version[idx];
                let unique: Vec<UniqueChunk> = chunks
                    .iter()
                    .zip(own)
                    .filter(|(_, embedding)| {
                        let others = embeddings_per_version
                            .iter()
                            .enumerate()
                            .filter(|(other_idx, _)| *other_idx != idx)
                            .flat_map(|(_, other)| other.iter());
                        is_unique(max_similarity(embedding, others), threshold)
                    })
                    .map(|(text, _)| UniqueChunk {
                        text: text.clone(),
                        is_unique: true,
                    })
                    .collect();

                tracing::debug!(
                    "Version {}: {} of {} chunks unique",
                    version,
                    unique.len(),
                    chunks.len()
                );
                VersionHighlights {
                    version: version.clone(),
                    chunks: unique,
                }
            })
            .collect();

        Ok(highlights)
    }
}
