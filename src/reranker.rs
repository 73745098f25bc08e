//! Cross-encoder style reranking over semantic-search candidates.

use std::sync::Arc;

use async_trait::async_trait;

use crate::document::{Passage, ScoredPassage};
use crate::error::Result;

/// A query-aware relevance model scoring one (query, text) pair at a time.
///
/// This is the "(query, text) → score" seam: cross-encoder models, LLM
/// scorers, or lexical heuristics are all substitutable here.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score the relevance of `text` to `query`. Higher is more relevant.
    async fn score(&self, query: &str, text: &str) -> Result<f32>;
}

/// A lexical overlap scorer: the fraction of query keywords (longer than
/// three characters, case-insensitive) found in the candidate text.
///
/// Cheap, deterministic, and dependency-free; a useful default where no
/// hosted cross-encoder is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOverlapScorer;

#[async_trait]
impl RelevanceScorer for LexicalOverlapScorer {
    async fn score(&self, query: &str, text: &str) -> Result<f32> {
        let keywords: Vec<String> =
            query.split_whitespace().filter(|w| w.len() > 3).map(|w| w.to_lowercase()).collect();
        if keywords.is_empty() {
            return Ok(0.0);
        }
        let text = text.to_lowercase();
        let hits = keywords.iter().filter(|kw| text.contains(kw.as_str())).count();
        Ok(hits as f32 / keywords.len() as f32)
    }
}

/// Reranks a candidate set by re-scoring every pair with the injected
/// [`RelevanceScorer`] and keeping the `top_n` best.
///
/// A pure function of (query, candidates, scorer): no state is retained
/// between calls. The sort is stable, so ties keep the original candidate
/// order.
pub struct CrossEncoderReranker {
    scorer: Arc<dyn RelevanceScorer>,
    top_n: usize,
}

impl CrossEncoderReranker {
    /// Create a reranker keeping the `top_n` best candidates.
    pub fn new(scorer: Arc<dyn RelevanceScorer>, top_n: usize) -> Self {
        Self { scorer, top_n }
    }

    /// Re-score candidates against the query and return at most `top_n`
    /// passages, ordered by descending score.
    pub async fn rerank(&self, query: &str, candidates: Vec<ScoredPassage>) -> Result<Vec<Passage>> {
        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let score = self.scorer.score(query, &candidate.passage.text).await?;
            scored.push(ScoredPassage { passage: candidate.passage, score });
        }

        // Stable sort: equal scores preserve original candidate order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.top_n);
        Ok(scored.into_iter().map(|s| s.passage).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: &str, text: &str) -> ScoredPassage {
        ScoredPassage {
            passage: Passage {
                id: id.into(),
                text: text.into(),
                document_id: "doc".into(),
                page: 1,
            },
            score: 0.0,
        }
    }

    #[tokio::test]
    async fn rerank_orders_by_overlap_and_bounds_to_top_n() {
        let reranker = CrossEncoderReranker::new(Arc::new(LexicalOverlapScorer), 2);
        let candidates = vec![
            passage("a", "nothing to see here"),
            passage("b", "attention mechanism in transformer models"),
            passage("c", "the attention weights"),
        ];
        let reranked = reranker.rerank("attention mechanism", candidates).await.unwrap();
        assert_eq!(reranked.len(), 2);
        assert_eq!(reranked[0].id, "b");
        assert_eq!(reranked[1].id, "c");
    }

    #[tokio::test]
    async fn ties_keep_original_candidate_order() {
        let reranker = CrossEncoderReranker::new(Arc::new(LexicalOverlapScorer), 3);
        let candidates = vec![
            passage("first", "unrelated text one"),
            passage("second", "unrelated text two"),
            passage("third", "unrelated text three"),
        ];
        let reranked = reranker.rerank("quantum chromodynamics", candidates).await.unwrap();
        let ids: Vec<&str> = reranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn rerank_is_deterministic() {
        let reranker = CrossEncoderReranker::new(Arc::new(LexicalOverlapScorer), 2);
        let candidates = || {
            vec![
                passage("a", "self attention lets the model attend"),
                passage("b", "positional encoding adds order"),
                passage("c", "attention attention attention"),
            ]
        };
        let first = reranker.rerank("self attention", candidates()).await.unwrap();
        let second = reranker.rerank("self attention", candidates()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_candidates_yield_empty_result() {
        let reranker = CrossEncoderReranker::new(Arc::new(LexicalOverlapScorer), 2);
        let reranked = reranker.rerank("anything", Vec::new()).await.unwrap();
        assert!(reranked.is_empty());
    }
}
