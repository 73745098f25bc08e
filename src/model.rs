//! Chat-completion boundary used by the classification stages.

use async_trait::async_trait;

use crate::error::Result;

/// A chat-completion model invoked with a system prompt and a user prompt.
///
/// The routing, grading, and answer-finalization stages each issue one
/// call through this trait. Implementations should favor deterministic
/// decoding (temperature 0) since the callers treat replies as
/// classification output.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the model's reply text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Model`](crate::RagError::Model) on transport or
    /// API failure; callers wrap this with the name of the failing stage.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}
