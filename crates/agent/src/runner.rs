//! The agent loop controller.
//!
//! One call to [`AgentLoop::run`] drives one task to completion:
//! request a completion stream, drain it token by token into the
//! scratchpad, re-parse the whole scratchpad, and either stop on a
//! final answer, act on a tool request, or end unproductively.
//!
//! Depth lives on the task owned by this call, never a shared counter,
//! and the recursion is an explicit loop, so a long chain cannot grow
//! the call stack. The depth guard is the *single* fatal error here;
//! every other failure degrades to "no answer".

use reagent_core::error::{Error, ToolError};
use reagent_core::task::{Task, TaskId, TaskState};
use reagent_core::trace::{parse_trace, TraceKind};
use reagent_provider::CompletionBackend;
use reagent_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::prompt::render_prompt;

/// Maximum completed actions per task. The guard runs at loop entry,
/// so the sixth iteration of a chain that keeps acting is the one that
/// aborts.
pub const MAX_DEPTH: u32 = 5;

/// Drives the ReAct cycle for one question at a time.
pub struct AgentLoop {
    backend: Arc<dyn CompletionBackend>,
    tools: Arc<ToolRegistry>,
    max_depth: u32,
}

impl AgentLoop {
    pub fn new(backend: Arc<dyn CompletionBackend>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            backend,
            tools,
            max_depth: MAX_DEPTH,
        }
    }

    /// Override the depth bound.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Run one task to completion.
    ///
    /// `on_token` fires synchronously for every non-empty streamed token
    /// and for each synthesized observation segment, strictly in arrival
    /// order. Returns `Ok(Some(answer))` when a final answer was parsed,
    /// `Ok(None)` when the chain ended unproductively, and an error only
    /// for the fatal depth-limit condition.
    pub async fn run(
        &self,
        question: &str,
        mut on_token: impl FnMut(&str) + Send,
    ) -> Result<Option<String>, Error> {
        let mut task = Task::new(TaskId::new(), question);
        let stop = vec![format!("\n{}", TraceKind::Observation.marker())];

        info!(task = %task.id, question = %question, "Agent loop starting");

        // The prompt template ends mid-line after "Thought:"; surface
        // that prefix so the caller's transcript reads like the chain.
        on_token(&format!("{} ", TraceKind::Thought.marker()));

        loop {
            if task.depth >= self.max_depth {
                task.state = TaskState::Aborted;
                error!(task = %task.id, depth = task.depth, "Depth limit reached, aborting task");
                return Err(Error::DepthLimit {
                    limit: self.max_depth,
                });
            }

            let prompt = render_prompt(&self.tools, &task.question, &task.scratchpad);
            let mut stream = match self.backend.open_stream(&prompt, &stop).await {
                Ok(stream) => stream,
                Err(e) => {
                    error!(task = %task.id, error = %e, "Failed to open completion stream");
                    return Ok(None);
                }
            };

            while let Some(item) = stream.next().await {
                match item {
                    Ok(token) if token.is_empty() => {}
                    Ok(token) => {
                        task.append(&token);
                        on_token(&token);
                    }
                    Err(e) => {
                        // Decide on whatever text accumulated; a cut
                        // stream is not fatal to the task.
                        warn!(task = %task.id, error = %e, "Stream interrupted");
                        break;
                    }
                }
            }

            let parsed = parse_trace(&task.scratchpad);

            if let Some(answer) = parsed.final_answer() {
                let answer = answer.to_string();
                stream.cancel();
                task.state = TaskState::Answered;
                info!(task = %task.id, depth = task.depth, "Final answer parsed");
                return Ok(Some(answer));
            }

            let (Some(action), Some(input)) = (parsed.action(), parsed.action_input()) else {
                debug!(task = %task.id, depth = task.depth, "No final answer and no complete action; ending without answer");
                return Ok(None);
            };

            let Some(tool) = self.tools.get(action) else {
                let e = ToolError::NotFound(action.to_string());
                warn!(task = %task.id, error = %e, "Model chose an unknown tool");
                return Ok(None);
            };

            let observation = match tool.execute(input).await {
                Ok(observation) => observation,
                Err(e) => {
                    error!(task = %task.id, tool = %action, error = %e, "Tool execution failed");
                    return Ok(None);
                }
            };

            debug!(task = %task.id, tool = %action, "Tool executed, injecting observation");
            let segment = format!("\n{} {}\n", TraceKind::Observation.marker(), observation);
            on_token(&segment);
            task.append(&segment);
            task.depth += 1;
        }
    }
}
