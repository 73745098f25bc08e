//! Web-search provider boundary and the Tavily client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::WebHit;
use crate::error::{RagError, Result};

/// An external web-search provider: query string in, ranked hits out.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Search the web, returning at most `max_results` hits.
    ///
    /// An empty hit list is a valid (negative) result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Retrieval`] tagged `web_search` on transport or
    /// provider failure.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebHit>>;
}

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// A [`WebSearchProvider`] backed by the Tavily search API.
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    search_url: String,
}

impl TavilyClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Retrieval {
                backend: "web_search".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self { client: reqwest::Client::new(), api_key, search_url: TAVILY_SEARCH_URL.into() })
    }

    /// Create a new client using the `TAVILY_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("TAVILY_API_KEY").map_err(|_| RagError::Retrieval {
            backend: "web_search".into(),
            message: "TAVILY_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Override the search endpoint URL.
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl WebSearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebHit>> {
        debug!(query, max_results, "tavily search");

        let response = self
            .client
            .post(&self.search_url)
            .bearer_auth(&self.api_key)
            .json(&TavilyRequest { query, max_results })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "tavily request failed");
                RagError::Retrieval {
                    backend: "web_search".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "tavily API error");
            return Err(RagError::Retrieval {
                backend: "web_search".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let parsed: TavilyResponse = response.json().await.map_err(|e| RagError::Retrieval {
            backend: "web_search".into(),
            message: format!("failed to parse response: {e}"),
        })?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| WebHit { title: r.title, url: r.url, content: r.content })
            .collect())
    }
}
