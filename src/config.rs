//! Configuration for the question-answering pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for an [`AgenticRag`](crate::AgenticRag) instance.
///
/// Credentials are not part of this struct; they are read from the
/// `OPENAI_API_KEY` and `TAVILY_API_KEY` environment variables (or passed
/// to the provider constructors directly).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Path to the source document (paginated plain text).
    pub source_path: PathBuf,
    /// Identifier for the source document, used in passage IDs.
    pub document_id: String,
    /// One-line description of what the local corpus covers, given to the
    /// routing classifier.
    pub corpus_description: String,
    /// Maximum passage size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive passages.
    pub chunk_overlap: usize,
    /// Number of candidates returned by semantic search before reranking.
    pub top_k: usize,
    /// Number of passages kept after reranking.
    pub rerank_top_n: usize,
    /// Maximum number of web-search results per query.
    pub max_web_results: usize,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Chat model identifier used for the classification stages.
    pub chat_model: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::new(),
            document_id: "source".to_string(),
            corpus_description: "a research paper".to_string(),
            chunk_size: 512,
            chunk_overlap: 100,
            top_k: 5,
            rerank_top_n: 2,
            max_web_results: 3,
            embedding_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the source document path.
    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source_path = path.into();
        self
    }

    /// Set the source document identifier.
    pub fn document_id(mut self, id: impl Into<String>) -> Self {
        self.config.document_id = id.into();
        self
    }

    /// Set the corpus description handed to the routing classifier.
    pub fn corpus_description(mut self, description: impl Into<String>) -> Self {
        self.config.corpus_description = description.into();
        self
    }

    /// Set the maximum passage size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive passages in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of semantic-search candidates fed to the reranker.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the number of passages kept after reranking.
    pub fn rerank_top_n(mut self, n: usize) -> Self {
        self.config.rerank_top_n = n;
        self
    }

    /// Set the maximum number of web-search results per query.
    pub fn max_web_results(mut self, n: usize) -> Self {
        self.config.max_web_results = n;
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the chat model identifier.
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.config.chat_model = model.into();
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `source_path` is empty
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k`, `rerank_top_n`, or `max_web_results` is zero
    pub fn build(self) -> Result<RagConfig> {
        let config = self.config;
        if config.source_path.as_os_str().is_empty() {
            return Err(RagError::Config("source_path is required".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if config.rerank_top_n == 0 {
            return Err(RagError::Config("rerank_top_n must be greater than zero".to_string()));
        }
        if config.max_web_results == 0 {
            return Err(RagError::Config("max_web_results must be greater than zero".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accepts_valid_config() {
        let config = RagConfig::builder()
            .source_path("data/paper.txt")
            .top_k(8)
            .rerank_top_n(3)
            .build()
            .unwrap();
        assert_eq!(config.top_k, 8);
        assert_eq!(config.rerank_top_n, 3);
        assert_eq!(config.chunk_size, 512);
    }

    #[test]
    fn builder_rejects_missing_source() {
        assert!(matches!(RagConfig::builder().build(), Err(RagError::Config(_))));
    }

    #[test]
    fn builder_rejects_overlap_ge_chunk_size() {
        let result = RagConfig::builder()
            .source_path("data/paper.txt")
            .chunk_size(100)
            .chunk_overlap(100)
            .build();
        assert!(matches!(result, Err(RagError::Config(_))));
    }

    #[test]
    fn builder_rejects_zero_limits() {
        let result = RagConfig::builder().source_path("data/paper.txt").top_k(0).build();
        assert!(matches!(result, Err(RagError::Config(_))));
    }
}
