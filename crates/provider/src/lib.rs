//! Completion-stream backends for Reagent.
//!
//! A [`CompletionBackend`] knows how to send a prompt to an LLM and get
//! text back, either whole or as a cancellable stream of incremental
//! tokens. The agent loop calls it without knowing which backend is in
//! use — pure polymorphism, and tests substitute a scripted one.

pub mod openai;
pub mod sse;

use async_trait::async_trait;
use reagent_core::error::ProviderError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

pub use openai::OpenAiClient;
pub use sse::SseDecoder;

/// The abstraction over chat-completion transports.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai").
    fn name(&self) -> &str;

    /// Open a cancellable streaming completion for `prompt`.
    ///
    /// `stop` sequences are forwarded to the model so generation halts
    /// before the model fabricates text past them.
    async fn open_stream(
        &self,
        prompt: &str,
        stop: &[String],
    ) -> std::result::Result<TokenStream, ProviderError>;

    /// Send a prompt and get the complete response text in one piece.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
}

/// Idempotent abort signal for one in-flight stream.
///
/// Safe to fire after the stream already closed naturally; every
/// invocation past the first is a no-op on the stream but is still
/// counted, which the loop's exactly-once cancellation contract is
/// checked against.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    notify: Notify,
    calls: AtomicUsize,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelInner {
                notify: Notify::new(),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_count() > 0
    }

    /// How many times [`cancel`](Self::cancel) has been invoked.
    pub fn cancel_count(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A finite, ordered sequence of decoded token strings from one
/// completion stream. One instance per stream; not restartable.
pub struct TokenStream {
    rx: mpsc::Receiver<std::result::Result<String, ProviderError>>,
    cancel: CancelHandle,
}

impl TokenStream {
    pub fn new(
        rx: mpsc::Receiver<std::result::Result<String, ProviderError>>,
        cancel: CancelHandle,
    ) -> Self {
        Self { rx, cancel }
    }

    /// The next decoded token, or `None` when the stream has ended.
    pub async fn next(&mut self) -> Option<std::result::Result<String, ProviderError>> {
        self.rx.recv().await
    }

    /// Abort the underlying stream. Idempotent, safe after natural close.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_handle_is_idempotent() {
        let handle = CancelHandle::new();
        assert!(!handle.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(handle.cancel_count(), 2);
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let handle = CancelHandle::new();
        let waiter = handle.clone();
        let join = tokio::spawn(async move { waiter.cancelled().await });
        handle.cancel();
        join.await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_resolves_when_already_cancelled() {
        let handle = CancelHandle::new();
        handle.cancel();
        // Must not hang even though cancellation predates the wait.
        handle.cancelled().await;
    }

    #[tokio::test]
    async fn token_stream_drains_in_order() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = TokenStream::new(rx, CancelHandle::new());
        tx.send(Ok("a".to_string())).await.unwrap();
        tx.send(Ok("b".to_string())).await.unwrap();
        drop(tx);

        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        assert_eq!(stream.next().await.unwrap().unwrap(), "b");
        assert!(stream.next().await.is_none());
    }
}
