//! Shared test helpers for agent loop tests.

use async_trait::async_trait;
use reagent_core::error::{ProviderError, ToolError};
use reagent_provider::{CancelHandle, CompletionBackend, TokenStream};
use reagent_tools::{Tool, ToolRegistry};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A backend that replays scripted token batches, one per stream open.
///
/// Opening a stream past the end of the script yields a provider error
/// (as a real backend would when its endpoint is down). Every stream's
/// cancel handle is retained so tests can assert cancellation counts.
pub struct ScriptedBackend {
    scripts: Mutex<VecDeque<Vec<String>>>,
    handles: Mutex<Vec<CancelHandle>>,
    completion: Option<String>,
}

impl ScriptedBackend {
    pub fn new(scripts: Vec<Vec<&str>>) -> Self {
        Self {
            scripts: Mutex::new(
                scripts
                    .into_iter()
                    .map(|tokens| tokens.into_iter().map(str::to_string).collect())
                    .collect(),
            ),
            handles: Mutex::new(Vec::new()),
            completion: None,
        }
    }

    /// The cancel handle of the `index`-th opened stream.
    pub fn cancel_handle(&self, index: usize) -> CancelHandle {
        self.handles.lock().unwrap()[index].clone()
    }

    /// How many streams have been opened so far.
    pub fn streams_opened(&self) -> usize {
        self.handles.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn open_stream(
        &self,
        _prompt: &str,
        _stop: &[String],
    ) -> Result<TokenStream, ProviderError> {
        let Some(tokens) = self.scripts.lock().unwrap().pop_front() else {
            return Err(ProviderError::NotConfigured("script exhausted".into()));
        };

        let (tx, rx) = mpsc::channel(tokens.len().max(1));
        for token in tokens {
            tx.send(Ok(token)).await.expect("scripted channel full");
        }
        drop(tx);

        let cancel = CancelHandle::new();
        self.handles.lock().unwrap().push(cancel.clone());
        Ok(TokenStream::new(rx, cancel))
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.completion
            .clone()
            .ok_or_else(|| ProviderError::NotConfigured("no scripted completion".into()))
    }
}

/// Echoes its input back as the observation.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "Echo"
    }
    fn description(&self) -> &str {
        "Echoes back the input"
    }
    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        Ok(input.to_string())
    }
}

/// Always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "Broken"
    }
    fn description(&self) -> &str {
        "Fails on every invocation"
    }
    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "Broken".into(),
            reason: "always fails".into(),
        })
    }
}

/// Build a registry from the given tools, preserving order.
pub fn registry_with(tools: Vec<Box<dyn Tool>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool);
    }
    registry
}
