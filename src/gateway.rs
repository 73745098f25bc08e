//! The retrieval gateway: one query interface over two backends.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::{RouteDecision, WebHit};
use crate::error::Result;
use crate::reranker::CrossEncoderReranker;
use crate::store::DocumentStore;
use crate::websearch::WebSearchProvider;

/// Returned by the vectorstore path when retrieval succeeds but yields no
/// usable passage text. Downstream grading must treat this as empty
/// evidence, never as a valid answer.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant context found in the knowledge base.";

/// Dispatches a query to the local document store (search + rerank) or to
/// the web-search provider, based on an upstream routing decision.
///
/// The returned text is raw backend output; callers must carry it
/// downstream unmodified.
pub struct RetrievalGateway {
    store: Arc<DocumentStore>,
    reranker: CrossEncoderReranker,
    web: Arc<dyn WebSearchProvider>,
    top_k: usize,
    max_web_results: usize,
}

impl RetrievalGateway {
    /// Create a gateway with default limits (`top_k` 5, `max_web_results` 3).
    pub fn new(
        store: Arc<DocumentStore>,
        reranker: CrossEncoderReranker,
        web: Arc<dyn WebSearchProvider>,
    ) -> Self {
        Self { store, reranker, web, top_k: 5, max_web_results: 3 }
    }

    /// Override the candidate and web-result limits.
    pub fn with_limits(mut self, top_k: usize, max_web_results: usize) -> Self {
        self.top_k = top_k;
        self.max_web_results = max_web_results;
        self
    }

    /// Retrieve raw context for the query from the routed backend.
    ///
    /// The `vectorstore` path never returns an empty string: it yields
    /// passage text or exactly [`NO_CONTEXT_SENTINEL`]. The `web_search`
    /// path returns the formatted hits verbatim (possibly empty when the
    /// provider legitimately found nothing).
    ///
    /// # Errors
    ///
    /// Backend failures propagate as
    /// [`RagError::Retrieval`](crate::RagError::Retrieval) tagged with the
    /// backend name; they are never converted into the sentinel.
    pub async fn retrieve(&self, query: &str, route: RouteDecision) -> Result<String> {
        match route {
            RouteDecision::Vectorstore => self.retrieve_local(query).await,
            RouteDecision::WebSearch => self.retrieve_web(query).await,
        }
    }

    async fn retrieve_local(&self, query: &str) -> Result<String> {
        let candidates = self.store.search(query, self.top_k).await?;
        debug!(candidate_count = candidates.len(), "semantic search complete");

        let passages = self.reranker.rerank(query, candidates).await?;
        let context = passages
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        info!(backend = "vectorstore", context_len = context.len(), "retrieval complete");
        if context.trim().is_empty() {
            return Ok(NO_CONTEXT_SENTINEL.to_string());
        }
        Ok(context)
    }

    async fn retrieve_web(&self, query: &str) -> Result<String> {
        let hits = self.web.search(query, self.max_web_results).await?;
        info!(backend = "web_search", hit_count = hits.len(), "retrieval complete");
        Ok(format_hits(&hits))
    }
}

/// Format web hits as `Title / URL / Content` blocks joined by blank lines.
fn format_hits(hits: &[WebHit]) -> String {
    hits.iter()
        .map(|hit| format!("Title: {}\nURL: {}\nContent: {}", hit.title, hit.url, hit.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_format_as_blocks() {
        let hits = vec![
            WebHit { title: "A".into(), url: "http://a".into(), content: "alpha".into() },
            WebHit { title: "B".into(), url: "http://b".into(), content: "beta".into() },
        ];
        assert_eq!(
            format_hits(&hits),
            "Title: A\nURL: http://a\nContent: alpha\n\nTitle: B\nURL: http://b\nContent: beta"
        );
    }

    #[test]
    fn no_hits_format_as_empty_string() {
        assert_eq!(format_hits(&[]), "");
    }
}
