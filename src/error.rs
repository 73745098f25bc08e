//! Error types for the `agentic-rag` crate.

use thiserror::Error;

/// Errors that can occur in the question-answering pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// The source document could not be loaded or indexed at startup.
    #[error("Load error: {0}")]
    Load(String),

    /// A retrieval backend failed to produce a result.
    #[error("Retrieval error ({backend}): {message}")]
    Retrieval {
        /// The backend that failed (`vectorstore` or `web_search`).
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A pipeline stage could not produce a verdict.
    #[error("Pipeline error at stage '{stage}': {message}")]
    Pipeline {
        /// The stage that failed.
        stage: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A chat-completion call failed at the transport or API level.
    ///
    /// The pipeline controller wraps these into [`RagError::Pipeline`]
    /// with the name of the stage that issued the call.
    #[error("Model error: {0}")]
    Model(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
