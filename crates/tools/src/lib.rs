//! Built-in tool implementations for Reagent.
//!
//! A tool is one named capability the model may pick as its `Action`.
//! Descriptions are rendered verbatim into the prompt, and registry
//! order is prompt order — wording and position directly shape which
//! actions the model chooses. Adding or removing a tool is an edit to
//! the registry; no other component changes.

pub mod ask_human;
pub mod clock;
pub mod compute;

use async_trait::async_trait;
use reagent_bridge::EvalBridge;
use reagent_core::error::ToolError;
use reagent_provider::CompletionBackend;
use std::sync::Arc;

/// The observation fed back to the model when a tool cannot produce a
/// real result. The model decides whether to retry with a new action.
pub const FALLBACK_ANSWER: &str = "I don't know.";

/// One capability the agent can invoke.
///
/// The input is the single line the model put after `Action Input:`;
/// the output becomes the `Observation:` content.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool, as the model must spell it.
    fn name(&self) -> &str;

    /// A description of what this tool does (rendered into the prompt).
    fn description(&self) -> &str;

    /// Execute the tool with the parsed action-input line.
    async fn execute(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// An insertion-ordered registry of available tools.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool at the end of the prompt order.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Registered tool names, in prompt order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Render the `name: description` lines shown to the model.
    pub fn descriptor_block(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry for in-process use: no remote executor available.
pub fn local_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(clock::ClockTool));
    registry.register(Box::new(ask_human::AskHumanTool));
    registry
}

/// Full registry for gateway sessions with a connected remote executor.
pub fn default_registry(
    backend: Arc<dyn CompletionBackend>,
    bridge: Arc<EvalBridge>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(clock::ClockTool));
    registry.register(Box::new(compute::ComputeTool::new(backend, bridge)));
    registry.register(Box::new(ask_human::AskHumanTool));
    registry
}
