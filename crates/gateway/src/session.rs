//! One WebSocket connection, one session.
//!
//! Each session owns an outbound envelope channel, an [`EvalBridge`]
//! wired to it, and a tool registry whose `Compute` tool evaluates code
//! on the connected client. Questions run as independent spawned tasks,
//! so a slow chain never blocks the read loop — eval responses keep
//! flowing to the bridge while the agent works.

use reagent_agent::AgentLoop;
use reagent_bridge::EvalBridge;
use reagent_core::envelope::Envelope;
use reagent_core::error::Error;
use reagent_provider::CompletionBackend;
use reagent_tools::{default_registry, ToolRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Per-connection state shared by the read loop and spawned tasks.
pub struct Session {
    backend: Arc<dyn CompletionBackend>,
    outbound: mpsc::UnboundedSender<Envelope>,
    bridge: Arc<EvalBridge>,
    tools: Arc<ToolRegistry>,
}

impl Session {
    /// Build a session that ships its envelopes on `outbound`.
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        outbound: mpsc::UnboundedSender<Envelope>,
    ) -> Self {
        let bridge = Arc::new(EvalBridge::new(outbound.clone()));
        let tools = Arc::new(default_registry(backend.clone(), bridge.clone()));
        Self {
            backend,
            outbound,
            bridge,
            tools,
        }
    }

    /// The eval bridge bound to this session's client.
    pub fn bridge(&self) -> &Arc<EvalBridge> {
        &self.bridge
    }

    /// Route one inbound envelope.
    pub async fn handle_inbound(&self, envelope: Envelope) {
        match envelope {
            Envelope::Question { id, question } => self.spawn_task(id, question),
            response @ (Envelope::EvalSuccess { .. } | Envelope::EvalError { .. }) => {
                if !self.bridge.resolve_envelope(&response).await {
                    warn!(
                        kind = response.kind(),
                        "Dropped eval response with no pending call"
                    );
                }
            }
            other => {
                warn!(kind = other.kind(), "Ignoring unexpected inbound envelope");
            }
        }
    }

    /// Run one question to completion on its own task.
    fn spawn_task(&self, id: String, question: String) {
        let agent = AgentLoop::new(self.backend.clone(), self.tools.clone());
        let outbound = self.outbound.clone();

        tokio::spawn(async move {
            info!(task = %id, "Question accepted");

            let token_tx = outbound.clone();
            let task_id = id.clone();
            let result = agent
                .run(&question, move |token| {
                    let _ = token_tx.send(Envelope::Token {
                        id: task_id.clone(),
                        token: token.to_string(),
                    });
                })
                .await;

            let envelope = match result {
                Ok(answer) => Envelope::Answer {
                    id,
                    answer: answer.unwrap_or_default(),
                },
                Err(e @ Error::DepthLimit { .. }) => Envelope::Error {
                    error: e.to_string(),
                },
                Err(e) => {
                    error!(error = %e, "Agent task failed");
                    Envelope::Error {
                        error: e.to_string(),
                    }
                }
            };
            let _ = outbound.send(envelope);
        });
    }
}
