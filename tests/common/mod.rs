//! Shared deterministic test doubles for the pipeline integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agentic_rag::{
    ChatModel, CrossEncoderReranker, DocumentStore, EmbeddingProvider, LexicalOverlapScorer,
    PassageExtractor, RagError, Result, RetrievalGateway, WebHit, WebSearchProvider,
};

/// Path to the paginated fixture document.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/attention.txt")
}

/// A deterministic bag-of-words embedder: each word hashes to one
/// dimension, counts are L2-normalized. Stable across runs and processes.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

fn fnv1a(word: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dims];
        for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            let idx = (fnv1a(word) % self.dims as u64) as usize;
            v[idx] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Returns the same fixed vector for every input; used where the query
/// embedding itself is the test input.
pub struct FixedEmbedder {
    pub vector: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// A chat model that replays scripted replies in order and records every
/// (system, user) prompt it receives.
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<(String, String)>>,
}

impl ScriptedChatModel {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// The prompts received so far, in call order.
    pub fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.seen.lock().unwrap().push((system.to_string(), user.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RagError::Model("no scripted reply left".into()))
    }
}

/// Returns a fixed hit list for every query.
pub struct StaticWebSearch {
    pub hits: Vec<WebHit>,
}

impl StaticWebSearch {
    pub fn empty() -> Self {
        Self { hits: Vec::new() }
    }
}

#[async_trait]
impl WebSearchProvider for StaticWebSearch {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<WebHit>> {
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

/// Simulates a web-search provider network failure.
pub struct FailingWebSearch;

#[async_trait]
impl WebSearchProvider for FailingWebSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<WebHit>> {
        Err(RagError::Retrieval {
            backend: "web_search".into(),
            message: "connection refused".into(),
        })
    }
}

/// Build a gateway over the fixture document with deterministic backends.
pub async fn fixture_gateway(web: Arc<dyn WebSearchProvider>) -> RetrievalGateway {
    let extractor = PassageExtractor::new(512, 100);
    let store = Arc::new(
        DocumentStore::build(&fixture_path(), "attention", &extractor, Arc::new(HashEmbedder::new(64)))
            .await
            .unwrap(),
    );
    let reranker = CrossEncoderReranker::new(Arc::new(LexicalOverlapScorer), 2);
    RetrievalGateway::new(store, reranker, web).with_limits(5, 3)
}

/// Three plausible web hits for the scenario tests.
pub fn sample_hits() -> Vec<WebHit> {
    vec![
        WebHit {
            title: "World News Roundup".into(),
            url: "https://news.example.com/today".into(),
            content: "A summit on climate policy concluded today with a joint statement.".into(),
        },
        WebHit {
            title: "Markets Today".into(),
            url: "https://news.example.com/markets".into(),
            content: "Stock indices closed mixed after the central bank announcement.".into(),
        },
    ]
}
