//! Data types flowing through the pipeline: passages, search hits, and
//! the enumerated stage outputs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A chunk of source document text used as a retrieval unit.
///
/// Passages are created once when the [`DocumentStore`](crate::DocumentStore)
/// is built and are immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// Unique identifier, `{document_id}_p{page}_{index}`.
    pub id: String,
    /// The text content of the passage.
    pub text: String,
    /// The ID of the source document.
    pub document_id: String,
    /// 1-based page number within the source document.
    pub page: usize,
}

/// A retrieved [`Passage`] paired with a relevance score.
///
/// Created transiently during retrieval and discarded after reranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    /// The retrieved passage.
    pub passage: Passage,
    /// The similarity or cross-encoder score (higher is more relevant).
    pub score: f32,
}

/// A single web-search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebHit {
    /// The page title.
    pub title: String,
    /// The page URL.
    pub url: String,
    /// A content snippet from the page.
    pub content: String,
}

/// The binary decision of which retrieval backend answers a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    /// Retrieve from the local document store.
    Vectorstore,
    /// Retrieve from the external web-search provider.
    WebSearch,
}

impl RouteDecision {
    /// The wire label for this decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::Vectorstore => "vectorstore",
            RouteDecision::WebSearch => "web_search",
        }
    }

    /// Resolve a classifier reply to a route.
    ///
    /// The reply is scanned for the `vectorstore` and `web_search` labels.
    /// An ambiguous reply (neither label, or both) resolves to
    /// [`RouteDecision::Vectorstore`], the lower-cost local path. This is a
    /// total function: routing is a forced binary choice.
    pub fn parse(reply: &str) -> RouteDecision {
        let reply = reply.to_lowercase();
        let web = reply.contains("web_search") || reply.contains("web search");
        let local = reply.contains("vectorstore");
        if web && !local { RouteDecision::WebSearch } else { RouteDecision::Vectorstore }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A one-shot yes/no judgment produced by a grading stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The graded property holds.
    Yes,
    /// The graded property does not hold.
    No,
}

impl Verdict {
    /// Parse a grader reply into a verdict.
    ///
    /// Scans the reply for the first `yes` or `no` token, case-insensitive,
    /// so replies like `"Yes."` or `"The answer is no"` resolve cleanly.
    /// Returns `None` when the reply contains neither token.
    pub fn parse(reply: &str) -> Option<Verdict> {
        for token in reply.split(|c: char| !c.is_ascii_alphabetic()) {
            match token.to_lowercase().as_str() {
                "yes" => return Some(Verdict::Yes),
                "no" => return Some(Verdict::No),
                _ => {}
            }
        }
        None
    }

    /// The wire label for this verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Yes => "yes",
            Verdict::No => "no",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_parse_exact_labels() {
        assert_eq!(RouteDecision::parse("vectorstore"), RouteDecision::Vectorstore);
        assert_eq!(RouteDecision::parse("web_search"), RouteDecision::WebSearch);
    }

    #[test]
    fn route_parse_surrounding_prose() {
        assert_eq!(
            RouteDecision::parse("I would pick 'web_search' for this one."),
            RouteDecision::WebSearch
        );
        assert_eq!(RouteDecision::parse("Route: VECTORSTORE"), RouteDecision::Vectorstore);
    }

    #[test]
    fn route_parse_ambiguous_defaults_to_vectorstore() {
        assert_eq!(RouteDecision::parse(""), RouteDecision::Vectorstore);
        assert_eq!(RouteDecision::parse("maybe?"), RouteDecision::Vectorstore);
        assert_eq!(
            RouteDecision::parse("either vectorstore or web_search"),
            RouteDecision::Vectorstore
        );
    }

    #[test]
    fn verdict_parse_tokens() {
        assert_eq!(Verdict::parse("yes"), Some(Verdict::Yes));
        assert_eq!(Verdict::parse("No."), Some(Verdict::No));
        assert_eq!(Verdict::parse("The verdict is: YES"), Some(Verdict::Yes));
        assert_eq!(Verdict::parse("nope"), None);
        assert_eq!(Verdict::parse(""), None);
    }

    #[test]
    fn verdict_parse_first_token_wins() {
        assert_eq!(Verdict::parse("yes, although arguably no"), Some(Verdict::Yes));
    }
}
