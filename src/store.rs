//! The local document knowledge base: passages plus a semantic index.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::PassageExtractor;
use crate::document::{Passage, ScoredPassage};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// An in-memory semantic index over the passages of one source document.
///
/// Built once at startup and read-only afterwards: `search` takes `&self`
/// over immutable state, so a store behind an `Arc` is safe to share
/// across concurrent pipeline runs without locking.
pub struct DocumentStore {
    embedder: Arc<dyn EmbeddingProvider>,
    passages: Vec<Passage>,
    embeddings: Vec<Vec<f32>>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("passages", &self.passages)
            .field("embeddings", &self.embeddings)
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Build a store by loading, chunking, and embedding a source document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Load`] if the file cannot be read, if chunking
    /// produces no passages, or if embedding fails. No partial index is
    /// ever retained.
    pub async fn build(
        source_path: &Path,
        document_id: &str,
        extractor: &PassageExtractor,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let text = std::fs::read_to_string(source_path).map_err(|e| {
            error!(path = %source_path.display(), error = %e, "failed to read source document");
            RagError::Load(format!("cannot read '{}': {e}", source_path.display()))
        })?;

        let passages = extractor.extract(document_id, &text);
        if passages.is_empty() {
            return Err(RagError::Load(format!(
                "source '{}' produced no passages",
                source_path.display()
            )));
        }

        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed while indexing source document");
            RagError::Load(format!("embedding failed while indexing: {e}"))
        })?;

        info!(
            path = %source_path.display(),
            passage_count = passages.len(),
            "document store built"
        );
        Ok(Self { embedder, passages, embeddings })
    }

    /// Assemble a store from already-embedded passages.
    ///
    /// `passages` and `embeddings` must be parallel sequences; the
    /// embedder is used only for query embedding.
    pub fn from_indexed(
        embedder: Arc<dyn EmbeddingProvider>,
        passages: Vec<Passage>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if passages.len() != embeddings.len() {
            return Err(RagError::Load(format!(
                "passage/embedding count mismatch: {} vs {}",
                passages.len(),
                embeddings.len()
            )));
        }
        Ok(Self { embedder, passages, embeddings })
    }

    /// Number of indexed passages.
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Whether the store holds no passages.
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Return the `k` passages most similar to the query, ordered by
    /// descending cosine similarity.
    ///
    /// Deterministic for a fixed index and embedding provider.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Retrieval`] tagged `vectorstore` if query
    /// embedding fails.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>> {
        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            RagError::Retrieval {
                backend: "vectorstore".into(),
                message: format!("query embedding failed: {e}"),
            }
        })?;

        let mut scored: Vec<ScoredPassage> = self
            .passages
            .iter()
            .zip(&self.embeddings)
            .map(|(passage, embedding)| ScoredPassage {
                passage: passage.clone(),
                score: cosine_similarity(embedding, &query_embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.3, -0.5, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
