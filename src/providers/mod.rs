//! LLM completion providers.

pub mod openai;

pub use openai::OpenAiProvider;

use crate::session::Turn;
use async_trait::async_trait;
use thiserror::Error;

/// Typed completion failures. The engine performs no retry or backoff; a
/// failed interaction aborts without mutating history.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Completion contract.
///
/// Input is the exact ordered sequence of turns assembled by the pipeline
/// (persona, history snapshot, new user turn); output is a single assistant
/// text or a typed failure.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Request one completion for the given ordered turn sequence.
    async fn complete(
        &self,
        messages: &[Turn],
        model: &str,
        temperature: f64,
    ) -> Result<String, CompletionError>;
}
