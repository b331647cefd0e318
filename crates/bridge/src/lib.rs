//! Request/response correlation over a fire-and-forget message channel.
//!
//! The remote code executor lives in a different process (the browser on
//! the far side of the WebSocket). Sends are fire-and-forget and replies
//! arrive unordered, so [`EvalBridge`] turns each send into an awaitable
//! call: a fresh correlation id, an entry in the pending table, and a
//! race between the matching response and a deadline.
//!
//! Exactly-once resolution: whichever of response or timeout fires first
//! removes the pending entry; anything arriving later for the same id is
//! dropped without error.

use reagent_core::envelope::Envelope;
use reagent_core::error::BridgeError;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default deadline for one remote evaluation.
pub const DEFAULT_EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// The outcome the remote executor reported for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalOutcome {
    Success(String),
    Error(String),
}

/// Correlates outbound `eval` envelopes with their inbound responses.
///
/// Cheap to clone is not needed: callers share it behind an `Arc`. The
/// pending table is the only concurrently-mutated structure in the
/// system; insert and the single resolving removal are serialized by the
/// table lock, per id.
pub struct EvalBridge {
    outbound: mpsc::UnboundedSender<Envelope>,
    pending: Mutex<HashMap<String, oneshot::Sender<EvalOutcome>>>,
    timeout: Duration,
}

impl EvalBridge {
    /// Create a bridge that sends `eval` envelopes on `outbound`.
    pub fn new(outbound: mpsc::UnboundedSender<Envelope>) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            timeout: DEFAULT_EVAL_TIMEOUT,
        }
    }

    /// Override the evaluation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ship `code` to the remote executor and await its result.
    ///
    /// Resolves with the executor's output, or rejects with
    /// [`BridgeError::Remote`] on an explicit remote failure and
    /// [`BridgeError::Timeout`] when the deadline elapses first.
    pub async fn invoke(&self, code: &str) -> Result<String, BridgeError> {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();

        self.pending.lock().await.insert(id.clone(), tx);
        debug!(%id, "Dispatching remote eval");

        let envelope = Envelope::Eval {
            id: id.clone(),
            code: code.to_string(),
        };
        if self.outbound.send(envelope).is_err() {
            self.pending.lock().await.remove(&id);
            return Err(BridgeError::ChannelClosed);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(EvalOutcome::Success(result))) => Ok(result),
            Ok(Ok(EvalOutcome::Error(error))) => Err(BridgeError::Remote(error)),
            // Resolver dropped without sending — the bridge itself went away.
            Ok(Err(_)) => Err(BridgeError::ChannelClosed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                warn!(%id, timeout_secs = self.timeout.as_secs(), "Remote eval timed out");
                Err(BridgeError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        }
    }

    /// Complete the pending call registered under `id`.
    ///
    /// Returns `false` when the id is unknown or already resolved; such
    /// responses are dropped without error.
    pub async fn resolve(&self, id: &str, outcome: EvalOutcome) -> bool {
        match self.pending.lock().await.remove(id) {
            Some(tx) => {
                // A dropped receiver means the caller timed out between
                // our removal and this send; that is still a resolution.
                let _ = tx.send(outcome);
                true
            }
            None => {
                debug!(%id, "Dropping response for unknown or resolved id");
                false
            }
        }
    }

    /// Route an inbound response envelope to its pending call.
    /// Non-response envelopes are ignored.
    pub async fn resolve_envelope(&self, envelope: &Envelope) -> bool {
        match envelope {
            Envelope::EvalSuccess { id, result } => {
                self.resolve(id, EvalOutcome::Success(result.clone())).await
            }
            Envelope::EvalError { id, error } => {
                self.resolve(id, EvalOutcome::Error(error.clone())).await
            }
            _ => false,
        }
    }

    /// Number of calls currently awaiting a response.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn bridge() -> (Arc<EvalBridge>, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(EvalBridge::new(tx)), rx)
    }

    fn sent_id(rx: &mut mpsc::UnboundedReceiver<Envelope>) -> String {
        match rx.try_recv().unwrap() {
            Envelope::Eval { id, .. } => id,
            other => panic!("expected eval envelope, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invoke_resolves_with_matching_response() {
        let (bridge, mut rx) = bridge();

        let call = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.invoke("1 + 1").await })
        };

        // Wait for the eval envelope to go out, then answer it.
        let envelope = rx.recv().await.unwrap();
        let Envelope::Eval { id, code } = envelope else {
            panic!("expected eval envelope");
        };
        assert_eq!(code, "1 + 1");
        assert!(bridge.resolve(&id, EvalOutcome::Success("2".into())).await);

        assert_eq!(call.await.unwrap().unwrap(), "2");
        assert_eq!(bridge.pending_count().await, 0);
    }

    #[tokio::test]
    async fn remote_error_is_distinct_from_timeout() {
        let (bridge, mut rx) = bridge();

        let call = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.invoke("broken()").await })
        };

        let envelope = rx.recv().await.unwrap();
        let Envelope::Eval { id, .. } = envelope else {
            panic!("expected eval envelope");
        };
        bridge
            .resolve(&id, EvalOutcome::Error("ReferenceError".into()))
            .await;

        match call.await.unwrap() {
            Err(BridgeError::Remote(msg)) => assert!(msg.contains("ReferenceError")),
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_calls_resolve_to_their_own_responses() {
        let (bridge, mut rx) = bridge();

        let first = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.invoke("first").await })
        };
        let envelope = rx.recv().await.unwrap();
        let Envelope::Eval { id: id_a, .. } = envelope else {
            panic!()
        };

        let second = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.invoke("second").await })
        };
        let envelope = rx.recv().await.unwrap();
        let Envelope::Eval { id: id_b, .. } = envelope else {
            panic!()
        };

        assert_ne!(id_a, id_b);
        assert_eq!(bridge.pending_count().await, 2);

        // Resolve out of dispatch order.
        bridge
            .resolve(&id_b, EvalOutcome::Success("result-b".into()))
            .await;
        bridge
            .resolve(&id_a, EvalOutcome::Success("result-a".into()))
            .await;

        assert_eq!(first.await.unwrap().unwrap(), "result-a");
        assert_eq!(second.await.unwrap().unwrap(), "result-b");
    }

    #[tokio::test]
    async fn unknown_id_is_a_noop() {
        let (bridge, _rx) = bridge();
        assert!(
            !bridge
                .resolve("never-registered", EvalOutcome::Success("x".into()))
                .await
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unresolved_call_rejects_after_timeout() {
        let (bridge, mut rx) = bridge();

        let result = bridge.invoke("sleep forever").await;
        match result {
            Err(BridgeError::Timeout { timeout_secs }) => assert_eq!(timeout_secs, 10),
            other => panic!("expected timeout, got {other:?}"),
        }

        // The entry is gone; a late-arriving response is ignored.
        let id = sent_id(&mut rx);
        assert!(!bridge.resolve(&id, EvalOutcome::Success("late".into())).await);
        assert_eq!(bridge.pending_count().await, 0);
    }

    #[tokio::test]
    async fn closed_channel_fails_fast() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let bridge = EvalBridge::new(tx);
        match bridge.invoke("anything").await {
            Err(BridgeError::ChannelClosed) => {}
            other => panic!("expected channel closed, got {other:?}"),
        }
        assert_eq!(bridge.pending_count().await, 0);
    }

    #[tokio::test]
    async fn resolve_envelope_routes_success_and_error() {
        let (bridge, mut rx) = bridge();

        let call = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.invoke("code").await })
        };
        let id = {
            let envelope = rx.recv().await.unwrap();
            let Envelope::Eval { id, .. } = envelope else {
                panic!()
            };
            id
        };

        // A non-response envelope is ignored.
        assert!(
            !bridge
                .resolve_envelope(&Envelope::Error { error: "x".into() })
                .await
        );

        assert!(
            bridge
                .resolve_envelope(&Envelope::EvalSuccess {
                    id,
                    result: "42".into()
                })
                .await
        );
        assert_eq!(call.await.unwrap().unwrap(), "42");
    }
}
