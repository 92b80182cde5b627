use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::domain::{ChatMessage, DomainError};

/// Lazy, single-use sequence of text fragments produced by a provider.
///
/// Dropping the stream abandons the underlying connection.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// A chat-completion backend that delivers its answer incrementally.
///
/// Implementors own transport, authentication and wire-format details. Every
/// failure, whether raised while opening the call or while reading it, must be
/// reported as a [`DomainError`] so that no vendor error type escapes the
/// adapter.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Open a streamed completion for `messages`.
    ///
    /// Fragments are yielded in the order the provider produces them. An `Err`
    /// item ends the useful part of the stream.
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<FragmentStream, DomainError>;

    fn model_name(&self) -> &str;
}
