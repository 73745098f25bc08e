//! # agentic-rag
//!
//! A routed retrieval-and-verification question-answering pipeline over a
//! single local corpus, with live web search as a fallback backend.
//!
//! Each question flows through five sequential stages:
//!
//! 1. **Route** — classify the question to the local `vectorstore` or to
//!    `web_search`, by meaning rather than keywords.
//! 2. **Retrieve** — semantic search plus cross-encoder reranking over the
//!    [`DocumentStore`], or formatted web hits, via the [`RetrievalGateway`].
//! 3. **Grade relevance** — does the retrieved content align with the
//!    question?
//! 4. **Grade hallucination** — is the content factually grounded?
//! 5. **Finalize** — extract a grounded answer, or re-source from the web
//!    when grounding fails; never fabricate.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use agentic_rag::{AgenticRag, RagConfig};
//!
//! # async fn run() -> agentic_rag::Result<()> {
//! let config = RagConfig::builder()
//!     .source_path("data/attention_is_all_you_need.txt")
//!     .corpus_description("the Transformer architecture paper 'Attention Is All You Need'")
//!     .build()?;
//!
//! let app = AgenticRag::build(config).await?;
//! let answered = app.ask("What is the Self-Attention Mechanism in Transformers?").await?;
//! println!("{answered}");
//! # Ok(())
//! # }
//! ```
//!
//! All provider seams ([`EmbeddingProvider`], [`RelevanceScorer`],
//! [`WebSearchProvider`], [`ChatModel`]) are traits, so every backend is
//! substitutable and independently testable.

pub mod app;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod gateway;
pub mod model;
pub mod openai;
pub mod pipeline;
pub mod reranker;
pub mod store;
pub mod websearch;

pub use app::{AgenticRag, AnsweredQuestion};
pub use chunking::PassageExtractor;
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Passage, RouteDecision, ScoredPassage, Verdict, WebHit};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use gateway::{NO_CONTEXT_SENTINEL, RetrievalGateway};
pub use model::ChatModel;
pub use openai::{OpenAIChatModel, OpenAIEmbeddingProvider};
pub use pipeline::{INSUFFICIENT_EVIDENCE, Pipeline, RunReport, Stage};
pub use reranker::{CrossEncoderReranker, LexicalOverlapScorer, RelevanceScorer};
pub use store::DocumentStore;
pub use websearch::{TavilyClient, WebSearchProvider};
