//! Entry point: wires configuration into a pipeline and answers questions.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::chunking::PassageExtractor;
use crate::config::RagConfig;
use crate::document::{RouteDecision, Verdict};
use crate::error::Result;
use crate::gateway::RetrievalGateway;
use crate::model::ChatModel;
use crate::openai::{OpenAIChatModel, OpenAIEmbeddingProvider};
use crate::pipeline::Pipeline;
use crate::reranker::{CrossEncoderReranker, LexicalOverlapScorer};
use crate::store::DocumentStore;
use crate::websearch::TavilyClient;

/// A final answer with its timing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    /// The answer text.
    pub answer: String,
    /// Wall-clock time taken by the pipeline run.
    pub elapsed: Duration,
    /// Which backend answered.
    pub route: RouteDecision,
    /// The relevance grader's verdict.
    pub relevance: Verdict,
    /// The hallucination grader's verdict.
    pub grounded: Verdict,
}

impl fmt::Display for AnsweredQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time: {:.2}s\n\nAnswer:\n{}", self.elapsed.as_secs_f64(), self.answer)
    }
}

/// The question-answering application.
///
/// Holds a built [`Pipeline`]; [`ask`](AgenticRag::ask) takes `&self` and
/// carries no cross-run state, so one instance serves concurrent
/// questions.
pub struct AgenticRag {
    pipeline: Pipeline,
}

impl AgenticRag {
    /// Build the application with OpenAI and Tavily providers.
    ///
    /// Reads `OPENAI_API_KEY` and `TAVILY_API_KEY` from the environment.
    /// Loads and indexes the source document; startup fails with
    /// [`RagError::Load`](crate::RagError::Load) rather than serving a
    /// partial index.
    pub async fn build(config: RagConfig) -> Result<Self> {
        let embedder = Arc::new(
            OpenAIEmbeddingProvider::from_env()?.with_model(config.embedding_model.clone()),
        );
        let chat: Arc<dyn ChatModel> =
            Arc::new(OpenAIChatModel::from_env()?.with_model(config.chat_model.clone()));
        let web = Arc::new(TavilyClient::from_env()?);

        let extractor = PassageExtractor::new(config.chunk_size, config.chunk_overlap);
        let store = Arc::new(
            DocumentStore::build(&config.source_path, &config.document_id, &extractor, embedder)
                .await?,
        );
        info!(passages = store.len(), "knowledge base ready");

        let reranker =
            CrossEncoderReranker::new(Arc::new(LexicalOverlapScorer), config.rerank_top_n);
        let gateway = Arc::new(
            RetrievalGateway::new(store, reranker, web)
                .with_limits(config.top_k, config.max_web_results),
        );

        let pipeline =
            Pipeline::new(chat, gateway).with_corpus_description(config.corpus_description);
        Ok(Self { pipeline })
    }

    /// Assemble the application from an already-built pipeline.
    ///
    /// Useful for substituting providers (custom scorers, mock backends).
    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Answer one question, measuring elapsed wall-clock time.
    pub async fn ask(&self, question: &str) -> Result<AnsweredQuestion> {
        let start = Instant::now();
        let report = self.pipeline.run(question).await?;
        let elapsed = start.elapsed();
        Ok(AnsweredQuestion {
            answer: report.answer,
            elapsed,
            route: report.route,
            relevance: report.relevance,
            grounded: report.grounded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answered_question_renders_time_and_answer() {
        let answered = AnsweredQuestion {
            answer: "Attention relates positions of a sequence.".into(),
            elapsed: Duration::from_millis(1234),
            route: RouteDecision::Vectorstore,
            relevance: Verdict::Yes,
            grounded: Verdict::Yes,
        };
        let rendered = answered.to_string();
        assert!(rendered.starts_with("Time: 1.23s"));
        assert!(rendered.ends_with("Answer:\nAttention relates positions of a sequence."));
    }
}
